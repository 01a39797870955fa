// =============================================================================
// Shor Factorization - Runtime Error Types
// =============================================================================
// Table of Contents:
//   1. QuantumRuntimeError - Main error enum
//   2. CircuitError - Circuit construction errors
//   3. ExecutionError - Execution-time errors
//   4. MeasurementError - Measurement distribution errors
// =============================================================================
// Purpose: Unified error handling across the quantum runtime layer. Device
//          and factorization crates wrap these rather than re-declaring them.
// =============================================================================

use thiserror::Error;

// =============================================================================
// 1. QuantumRuntimeError - Main error enum
// =============================================================================

#[derive(Debug, Error)]
pub enum QuantumRuntimeError {
    #[error("Circuit error: {0}")]
    Circuit(#[from] CircuitError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Measurement error: {0}")]
    Measurement(#[from] MeasurementError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

// =============================================================================
// 2. CircuitError - Circuit construction errors
// =============================================================================

#[derive(Debug, Error)]
pub enum CircuitError {
    #[error("Invalid qubit index {index}: circuit has {total} qubits")]
    InvalidQubitIndex { index: usize, total: usize },

    #[error("Circuit too large: {qubits} qubits exceeds maximum {max}")]
    CircuitTooLarge { qubits: usize, max: usize },

    #[error("Duplicate qubit in gate targets: qubit {0}")]
    DuplicateQubit(usize),

    #[error("Measured register is empty")]
    EmptyMeasurementRegister,
}

// =============================================================================
// 3. ExecutionError - Execution-time errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Invalid shot count: {0} (must be > 0)")]
    InvalidShotCount(u64),

    #[error("State dimension mismatch: circuit expects {expected} qubits, state has {actual}")]
    StateDimensionMismatch { expected: usize, actual: usize },

    #[error("Sampling failed: {0}")]
    SamplingFailed(String),
}

// =============================================================================
// 4. MeasurementError - Measurement distribution errors
// =============================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeasurementError {
    #[error("No measurements available")]
    NoMeasurements,

    #[error("Invalid bitstring length: expected {expected}, got {actual}")]
    InvalidBitstringLength { expected: usize, actual: usize },

    #[error("Bitstring {0:?} contains characters other than '0' and '1'")]
    InvalidBitCharacter(String),

    #[error("Bitstring width {0} is outside the supported range 1..=63")]
    UnsupportedWidth(usize),

    #[error("Measured value {value} does not fit in {width} bits")]
    ValueOutOfRange { value: u64, width: usize },

    #[error("Observation counts overflow a u64")]
    CountOverflow,

    #[error("Distribution declares {declared} shots but its counts sum to {counted}")]
    ShotCountMismatch { declared: u64, counted: u64 },
}

// =============================================================================
// Result type alias
// =============================================================================

pub type QuantumResult<T> = Result<T, QuantumRuntimeError>;
