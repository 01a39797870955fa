//! `shor-factor` - factor an integer with simulated order finding.
//!
//! Usage:
//!   shor-factor 15
//!   shor-factor 221 --workers 4 --seed 7 --json
//!   shor-factor 91 --config shor.toml --strategy truncation

use anyhow::{Context, Result};
use clap::Parser;
use shor_factorization::config::FactorizationConfig;
use shor_factorization::order::OrderResolutionStrategy;
use shor_factorization::{FactorizationReport, Factorizer};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "shor-factor", version, about = "Factor an integer with Shor's algorithm")]
struct Args {
    /// Integer to factor
    target: u64,

    /// TOML configuration file; command-line flags override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for base selection
    #[arg(long)]
    seed: Option<u64>,

    /// Shots per order-finding call
    #[arg(long)]
    shots: Option<u64>,

    /// Order resolution strategy
    #[arg(long, value_enum)]
    strategy: Option<OrderResolutionStrategy>,

    /// Maximum order-finding attempts
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Run this many independent searches in parallel; `[parallel] enabled`
    /// in the config file does the same with its own worker count
    #[arg(short, long)]
    workers: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn load_config(&self) -> Result<FactorizationConfig> {
        let mut config = match &self.config {
            Some(path) => FactorizationConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => FactorizationConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.search.seed = Some(seed);
        }
        if let Some(shots) = self.shots {
            config.execution.shots = shots;
        }
        if let Some(strategy) = self.strategy {
            config.order.strategy = strategy;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.search.max_attempts = max_attempts;
        }
        if let Some(workers) = self.workers {
            config.parallel.enabled = true;
            config.parallel.workers = workers;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays machine-readable.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let config = args.load_config()?;
    let parallel = config.parallel.enabled;
    let factorizer = Factorizer::with_config(config);

    let report = if parallel {
        factorizer.factorize_parallel(args.target).await
    } else {
        factorizer.factorize(args.target)
    }
    .with_context(|| format!("factoring {}", args.target))?;

    print_report(&report, args.json)
}

fn print_report(report: &FactorizationReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("{report}");
    if let (Some(base), Some(order)) = (report.base, report.order) {
        println!("  base {base} has order {order} modulo {}", report.target);
    }
    println!("  quantum invocations: {}", report.quantum_invocations);
    Ok(())
}
