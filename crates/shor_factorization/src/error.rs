// =============================================================================
// Shor Factorization - Error Types
// =============================================================================
// Table of Contents:
//   1. FactorizationError - Fatal errors surfaced to callers
//   2. NotFactorableReason
//   3. ConfigError - Configuration loading and validation
//   4. AttemptFailure - Recoverable per-attempt failures
// =============================================================================
// Purpose: Separates what ends a factorization (surfaced) from what only
//          ends one attempt (counted, then retried with a fresh base).
// =============================================================================

use quantum_device_abstraction::DeviceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// 1. FactorizationError
// =============================================================================

#[derive(Debug, Error)]
pub enum FactorizationError {
    #[error("{target} cannot be factored: {reason}")]
    NotFactorable {
        target: u64,
        reason: NotFactorableReason,
    },

    #[error("No factors of {target} found after {attempts} attempts ({elapsed_ms} ms)")]
    FactorizationFailed {
        target: u64,
        attempts: u32,
        elapsed_ms: u64,
    },

    #[error("Order-finding collaborator gave no answer within {timeout_ms} ms")]
    CollaboratorTimeout { timeout_ms: u64 },

    #[error("Order-finding collaborator failed: {0}")]
    Collaborator(#[from] DeviceError),

    #[error("Malformed measurement distribution: {0}")]
    MalformedDistribution(String),

    #[error("No registered device can find the order of {base} modulo {modulus}")]
    NoSuitableDevice { base: u64, modulus: u64 },

    #[error("Base selector produced {base}, outside [2, {}]", .target.saturating_sub(1))]
    InvalidBase { base: u64, target: u64 },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Search cancelled")]
    Cancelled,

    #[error("Search worker failed: {0}")]
    WorkerFailed(String),
}

pub type FactorizationResult<T> = Result<T, FactorizationError>;

// =============================================================================
// 2. NotFactorableReason
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotFactorableReason {
    BelowTwo,
    Prime,
}

impl fmt::Display for NotFactorableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFactorableReason::BelowTwo => write!(f, "value is below 2"),
            NotFactorableReason::Prime => write!(f, "value is prime"),
        }
    }
}

// =============================================================================
// 3. ConfigError
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Cannot read configuration file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    pub fn invalid_value<S: Into<String>>(field: &'static str, reason: S) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// 4. AttemptFailure
// =============================================================================

/// Why one attempt ended without factors. Always retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    #[error("measured phase is zero")]
    PhaseZero,

    #[error("order candidate {0} is odd")]
    OddOrder(u64),

    #[error("order candidate {order} gave only trivial factors")]
    TrivialFactors { order: u64 },
}
