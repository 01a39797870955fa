// =============================================================================
// Shor Factorization - Caller-Facing Factorizer
// =============================================================================
// Table of Contents:
//   1. FactorizationReport - Result handed back to callers
//   2. Factorizer - Configured entry point
//   3. factorize - One-call convenience
// =============================================================================

use crate::base_selection::{BaseSelector, RandomBaseSelector};
use crate::config::FactorizationConfig;
use crate::error::FactorizationResult;
use crate::parallel::ParallelFactorSearch;
use crate::pipeline::{DeviceSource, OrderFindingPipeline};
use crate::search::{FactorSearchLoop, ResolutionPath, SearchOutcome};
use parking_lot::Mutex;
use quantum_device_abstraction::{DeviceRegistry, QuantumDeviceInterface};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

// =============================================================================
// 1. FactorizationReport
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorizationReport {
    pub search_id: Uuid,
    pub target: u64,
    pub factor1: u64,
    pub factor2: u64,
    /// 1.0 when `factor1 · factor2 == target`, else 0.0.
    pub accuracy: f64,
    pub execution_time: Duration,
    pub attempts: u32,
    pub quantum_invocations: u32,
    pub resolution: ResolutionPath,
    pub base: Option<u64>,
    pub order: Option<u64>,
}

impl FactorizationReport {
    fn from_outcome(outcome: SearchOutcome, execution_time: Duration) -> Self {
        let accuracy = if outcome.pair.product() == u128::from(outcome.target) {
            1.0
        } else {
            0.0
        };
        Self {
            search_id: outcome.search_id,
            target: outcome.target,
            factor1: outcome.pair.factor1(),
            factor2: outcome.pair.factor2(),
            accuracy,
            execution_time,
            attempts: outcome.statistics.attempts,
            quantum_invocations: outcome.statistics.quantum_invocations,
            resolution: outcome.resolution,
            base: outcome.base,
            order: outcome.order,
        }
    }
}

impl fmt::Display for FactorizationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} × {} ({:?}, {} attempts, {:.3} ms)",
            self.target,
            self.factor1,
            self.factor2,
            self.resolution,
            self.attempts,
            self.execution_time.as_secs_f64() * 1000.0
        )
    }
}

// =============================================================================
// 2. Factorizer
// =============================================================================

pub struct Factorizer {
    config: FactorizationConfig,
    devices: DeviceSource,
    selector: Mutex<Box<dyn BaseSelector>>,
}

impl Default for Factorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Factorizer {
    /// Default configuration, routed to the built-in simulators.
    pub fn new() -> Self {
        Self::with_config(FactorizationConfig::default())
    }

    pub fn with_config(config: FactorizationConfig) -> Self {
        let selector = RandomBaseSelector::from_optional_seed(config.search.seed);
        Self {
            config,
            devices: DeviceSource::Registry(Arc::new(DeviceRegistry::with_default_simulators())),
            selector: Mutex::new(Box::new(selector)),
        }
    }

    /// Sends every order-finding request to `device`.
    pub fn with_device(mut self, device: Arc<dyn QuantumDeviceInterface>) -> Self {
        self.devices = DeviceSource::Fixed(device);
        self
    }

    pub fn with_registry(mut self, registry: Arc<DeviceRegistry>) -> Self {
        self.devices = DeviceSource::Registry(registry);
        self
    }

    /// Replaces the base selector used by `factorize`. Parallel searches
    /// always draw from per-worker random selectors.
    pub fn with_base_selector(mut self, selector: impl BaseSelector + 'static) -> Self {
        self.selector = Mutex::new(Box::new(selector));
        self
    }

    pub fn config(&self) -> &FactorizationConfig {
        &self.config
    }

    fn pipeline(&self) -> OrderFindingPipeline {
        OrderFindingPipeline::new(self.devices.clone())
            .with_strategy(self.config.order.strategy)
            .with_shots(self.config.execution.shots)
            .with_ancilla_width(self.config.execution.ancilla_width)
            .with_collaborator_timeout(self.config.collaborator_timeout())
    }

    pub fn factorize(&self, target: u64) -> FactorizationResult<FactorizationReport> {
        self.config.validate()?;
        let start_time = Instant::now();
        let search = FactorSearchLoop::new(self.pipeline())
            .with_max_attempts(self.config.search.max_attempts)
            .with_max_duration(self.config.max_duration());

        let mut selector = self.selector.lock();
        let outcome = search.run(target, &mut **selector)?;
        Ok(FactorizationReport::from_outcome(outcome, start_time.elapsed()))
    }

    pub async fn factorize_parallel(&self, target: u64) -> FactorizationResult<FactorizationReport> {
        self.config.validate()?;
        let start_time = Instant::now();
        let search = ParallelFactorSearch::new(self.pipeline(), self.config.parallel.workers)
            .with_max_attempts(self.config.search.max_attempts)
            .with_max_duration(self.config.max_duration())
            .with_seed(self.config.search.seed);

        let outcome = search.run(target).await?;
        Ok(FactorizationReport::from_outcome(outcome, start_time.elapsed()))
    }
}

impl fmt::Debug for Factorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factorizer")
            .field("config", &self.config)
            .field("devices", &self.devices)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// 3. factorize
// =============================================================================

/// Factors `target` with the default configuration and simulators.
pub fn factorize(target: u64) -> FactorizationResult<FactorizationReport> {
    Factorizer::new().factorize(target)
}
