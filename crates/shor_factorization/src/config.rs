// =============================================================================
// Shor Factorization - Configuration
// =============================================================================
// Table of Contents:
//   1. FactorizationConfig - Top-level configuration
//   2. Section types (search, execution, order, parallel)
//   3. Loading and validation
// =============================================================================
// Purpose: TOML-backed settings for the factorizer and the `shor-factor`
//          binary. Every section falls back to its defaults when omitted.
// =============================================================================

use crate::error::ConfigError;
use crate::order::OrderResolutionStrategy;
use quantum_runtime::measurement::MAXIMUM_BITSTRING_WIDTH;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 64;
pub const DEFAULT_SHOTS: u64 = 1024;
pub const DEFAULT_COLLABORATOR_TIMEOUT_MS: u64 = 30_000;

// =============================================================================
// 1. FactorizationConfig
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorizationConfig {
    pub search: SearchConfig,
    pub execution: ExecutionConfig,
    pub order: OrderConfig,
    pub parallel: ParallelConfig,
}

// =============================================================================
// 2. Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_attempts: u32,
    /// Wall-clock cap for one factorization; unlimited when absent.
    pub max_duration_ms: Option<u64>,
    /// Base-selection seed; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_duration_ms: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub shots: u64,
    /// Phase register width; `2·bit_length(N)` when absent.
    pub ancilla_width: Option<usize>,
    /// Collaborator deadline per call. `0` waits indefinitely.
    pub collaborator_timeout_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            shots: DEFAULT_SHOTS,
            ancilla_width: None,
            collaborator_timeout_ms: DEFAULT_COLLABORATOR_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    pub strategy: OrderResolutionStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Run `workers` independent searches instead of one.
    pub enabled: bool,
    pub workers: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            workers: num_cpus::get().max(1),
        }
    }
}

// =============================================================================
// 3. Loading and validation
// =============================================================================

impl FactorizationConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: FactorizationConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.max_attempts == 0 {
            return Err(ConfigError::invalid_value("search.max_attempts", "must be > 0"));
        }
        if self.search.max_duration_ms == Some(0) {
            return Err(ConfigError::invalid_value("search.max_duration_ms", "must be > 0"));
        }
        if self.execution.shots == 0 {
            return Err(ConfigError::invalid_value("execution.shots", "must be > 0"));
        }
        if let Some(width) = self.execution.ancilla_width {
            if width == 0 || width > MAXIMUM_BITSTRING_WIDTH {
                return Err(ConfigError::invalid_value(
                    "execution.ancilla_width",
                    format!("must be in 1..={}", MAXIMUM_BITSTRING_WIDTH),
                ));
            }
        }
        if self.parallel.workers == 0 {
            return Err(ConfigError::invalid_value("parallel.workers", "must be > 0"));
        }
        Ok(())
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.search.max_duration_ms.map(Duration::from_millis)
    }

    pub fn collaborator_timeout(&self) -> Option<Duration> {
        match self.execution.collaborator_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}
