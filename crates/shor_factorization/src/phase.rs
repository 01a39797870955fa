// =============================================================================
// Shor Factorization - Phase Extraction
// =============================================================================
// Table of Contents:
//   1. PhaseEstimate - Exact binary fraction k / 2^w
//   2. extract_phase - Most frequent bitstring → phase
// =============================================================================

use quantum_runtime::measurement::{MAXIMUM_BITSTRING_WIDTH, MeasurementDistribution, bitstring_to_value};
use quantum_runtime::error::MeasurementError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// 1. PhaseEstimate
// =============================================================================

/// A phase in [0, 1) stored exactly as `numerator / 2^ancilla_width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseEstimate {
    numerator: u64,
    ancilla_width: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseExtractionError {
    #[error("measured phase is zero")]
    PhaseZero,

    #[error("malformed distribution: {0}")]
    Malformed(#[from] MeasurementError),
}

impl PhaseEstimate {
    pub fn new(numerator: u64, ancilla_width: usize) -> Result<Self, PhaseExtractionError> {
        if ancilla_width == 0 || ancilla_width > MAXIMUM_BITSTRING_WIDTH {
            return Err(MeasurementError::UnsupportedWidth(ancilla_width).into());
        }
        if numerator >> ancilla_width != 0 {
            return Err(MeasurementError::ValueOutOfRange {
                value: numerator,
                width: ancilla_width,
            }
            .into());
        }
        Ok(Self {
            numerator,
            ancilla_width,
        })
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn ancilla_width(&self) -> usize {
        self.ancilla_width
    }

    /// `2^ancilla_width`.
    pub fn denominator(&self) -> u64 {
        1u64 << self.ancilla_width
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator() as f64
    }
}

impl fmt::Display for PhaseEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/2^{}", self.numerator, self.ancilla_width)
    }
}

// =============================================================================
// 2. extract_phase
// =============================================================================

/// Reads the most frequent bitstring (ties → lexicographically smallest) as a
/// big-endian binary fraction.
pub fn extract_phase(
    distribution: &MeasurementDistribution,
) -> Result<PhaseEstimate, PhaseExtractionError> {
    let (bitstring, _) = distribution.most_frequent();
    let numerator = bitstring_to_value(bitstring)?;
    let phase = PhaseEstimate::new(numerator, distribution.bitstring_width())?;
    if phase.is_zero() {
        return Err(PhaseExtractionError::PhaseZero);
    }
    Ok(phase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_bitstring_gives_exact_phase() {
        let distribution = MeasurementDistribution::from_counts(vec![("0100", 10)]).unwrap();
        let phase = extract_phase(&distribution).unwrap();
        assert_eq!(phase.numerator(), 4);
        assert_eq!(phase.denominator(), 16);
        assert_eq!(phase.as_f64(), 0.25);
    }

    #[test]
    fn test_most_frequent_wins() {
        let distribution =
            MeasurementDistribution::from_counts(vec![("000", 3), ("110", 9), ("010", 5)]).unwrap();
        assert_eq!(extract_phase(&distribution).unwrap().numerator(), 6);
    }

    #[test]
    fn test_ties_pick_smallest_value() {
        let distribution =
            MeasurementDistribution::from_counts(vec![("11", 4), ("01", 4), ("10", 4)]).unwrap();
        assert_eq!(extract_phase(&distribution).unwrap().numerator(), 1);
    }

    #[test]
    fn test_zero_phase_is_reported() {
        let distribution = MeasurementDistribution::from_counts(vec![("000", 7), ("100", 2)]).unwrap();
        assert_eq!(extract_phase(&distribution), Err(PhaseExtractionError::PhaseZero));
    }

    #[test]
    fn test_estimate_bounds() {
        assert!(PhaseEstimate::new(16, 4).is_err());
        assert!(PhaseEstimate::new(1, 0).is_err());
        assert_eq!(PhaseEstimate::new(3, 2).unwrap().to_string(), "3/2^2");
    }
}
