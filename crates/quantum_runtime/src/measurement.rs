// =============================================================================
// Shor Factorization - Measurement Module
// =============================================================================
// Table of Contents:
//   1. MeasurementDistribution - Bitstring → observation count
//   2. Bitstring helpers
// =============================================================================
// Purpose: The immutable result of one execution: how often each fixed-width
//          bitstring was observed. Construction validates the width and
//          character set so consumers can rely on a well-formed register.
// =============================================================================

use crate::error::MeasurementError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Widest register a distribution can describe; values must fit in a `u64`.
pub const MAXIMUM_BITSTRING_WIDTH: usize = 63;

// =============================================================================
// 1. MeasurementDistribution
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SerializedDistribution")]
pub struct MeasurementDistribution {
    bitstring_width: usize,
    bitstring_counts: BTreeMap<String, u64>,
    total_shots: u64,
}

/// Wire form; re-validated through `from_counts` on the way in.
#[derive(Deserialize)]
struct SerializedDistribution {
    bitstring_width: usize,
    bitstring_counts: BTreeMap<String, u64>,
    total_shots: u64,
}

impl TryFrom<SerializedDistribution> for MeasurementDistribution {
    type Error = MeasurementError;

    fn try_from(serialized: SerializedDistribution) -> Result<Self, Self::Error> {
        let distribution = Self::from_counts(serialized.bitstring_counts)?;
        if distribution.bitstring_width != serialized.bitstring_width {
            return Err(MeasurementError::InvalidBitstringLength {
                expected: serialized.bitstring_width,
                actual: distribution.bitstring_width,
            });
        }
        if distribution.total_shots != serialized.total_shots {
            return Err(MeasurementError::ShotCountMismatch {
                declared: serialized.total_shots,
                counted: distribution.total_shots,
            });
        }
        Ok(distribution)
    }
}

impl MeasurementDistribution {
    /// Builds a distribution from `(bitstring, count)` pairs. Repeated
    /// bitstrings are summed and zero counts dropped.
    pub fn from_counts<I, S>(counts: I) -> Result<Self, MeasurementError>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut bitstring_counts: BTreeMap<String, u64> = BTreeMap::new();
        let mut bitstring_width: Option<usize> = None;

        for (bitstring, count) in counts {
            let bitstring = bitstring.into();
            validate_bitstring(&bitstring)?;

            match bitstring_width {
                None => bitstring_width = Some(bitstring.len()),
                Some(expected) if expected != bitstring.len() => {
                    return Err(MeasurementError::InvalidBitstringLength {
                        expected,
                        actual: bitstring.len(),
                    });
                }
                Some(_) => {}
            }

            if count > 0 {
                let slot = bitstring_counts.entry(bitstring).or_insert(0);
                *slot = slot.checked_add(count).ok_or(MeasurementError::CountOverflow)?;
            }
        }

        let bitstring_width = bitstring_width.ok_or(MeasurementError::NoMeasurements)?;
        if bitstring_counts.is_empty() {
            return Err(MeasurementError::NoMeasurements);
        }
        let total_shots = bitstring_counts
            .values()
            .try_fold(0u64, |total, &count| total.checked_add(count))
            .ok_or(MeasurementError::CountOverflow)?;

        Ok(Self {
            bitstring_width,
            bitstring_counts,
            total_shots,
        })
    }

    /// Builds a distribution from `(register value, count)` pairs of a register
    /// `bitstring_width` bits wide.
    pub fn from_value_counts<I>(bitstring_width: usize, counts: I) -> Result<Self, MeasurementError>
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        let mut pairs = Vec::new();
        for (value, count) in counts {
            pairs.push((value_to_bitstring(value, bitstring_width)?, count));
        }
        Self::from_counts(pairs)
    }

    pub fn bitstring_width(&self) -> usize {
        self.bitstring_width
    }

    pub fn total_shots(&self) -> u64 {
        self.total_shots
    }

    pub fn distinct_outcomes(&self) -> usize {
        self.bitstring_counts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.bitstring_counts.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn count_of(&self, bitstring: &str) -> u64 {
        self.bitstring_counts.get(bitstring).copied().unwrap_or(0)
    }

    /// The bitstring observed most often. Ties go to the lexicographically
    /// smallest bitstring, which for a fixed width is the smallest value.
    pub fn most_frequent(&self) -> (&str, u64) {
        let mut best: Option<(&str, u64)> = None;
        for (bitstring, &count) in &self.bitstring_counts {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((bitstring.as_str(), count)),
            }
        }
        // Construction guarantees at least one outcome.
        best.unwrap_or(("", 0))
    }
}

// =============================================================================
// 2. Bitstring helpers
// =============================================================================

fn validate_bitstring(bitstring: &str) -> Result<(), MeasurementError> {
    if bitstring.is_empty() || bitstring.len() > MAXIMUM_BITSTRING_WIDTH {
        return Err(MeasurementError::UnsupportedWidth(bitstring.len()));
    }
    if !bitstring.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(MeasurementError::InvalidBitCharacter(bitstring.to_string()));
    }
    Ok(())
}

/// Big-endian value of a bitstring of `'0'`/`'1'` characters.
pub fn bitstring_to_value(bitstring: &str) -> Result<u64, MeasurementError> {
    validate_bitstring(bitstring)?;
    Ok(bitstring
        .bytes()
        .fold(0u64, |acc, bit| (acc << 1) | u64::from(bit == b'1')))
}

/// Zero-padded big-endian bitstring of `value` with exactly `width` characters.
pub fn value_to_bitstring(value: u64, width: usize) -> Result<String, MeasurementError> {
    if width == 0 || width > MAXIMUM_BITSTRING_WIDTH {
        return Err(MeasurementError::UnsupportedWidth(width));
    }
    if value >> width != 0 {
        return Err(MeasurementError::ValueOutOfRange { value, width });
    }
    Ok(format!("{:0width$b}", value, width = width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_from_counts() {
        let distribution =
            MeasurementDistribution::from_counts(vec![("00", 2), ("11", 2), ("00", 1)]).unwrap();
        assert_eq!(distribution.bitstring_width(), 2);
        assert_eq!(distribution.total_shots(), 5);
        assert_eq!(distribution.count_of("00"), 3);
        assert_eq!(distribution.count_of("11"), 2);
    }

    #[test]
    fn test_rejects_malformed_input() {
        let empty: Vec<(String, u64)> = Vec::new();
        assert_eq!(
            MeasurementDistribution::from_counts(empty),
            Err(MeasurementError::NoMeasurements)
        );
        assert!(matches!(
            MeasurementDistribution::from_counts(vec![("01", 1), ("011", 1)]),
            Err(MeasurementError::InvalidBitstringLength { expected: 2, actual: 3 })
        ));
        assert!(matches!(
            MeasurementDistribution::from_counts(vec![("0x", 1)]),
            Err(MeasurementError::InvalidBitCharacter(_))
        ));
        assert_eq!(
            MeasurementDistribution::from_counts(vec![("01", 0)]),
            Err(MeasurementError::NoMeasurements)
        );
    }

    #[test]
    fn test_most_frequent_breaks_ties_lexicographically() {
        let distribution =
            MeasurementDistribution::from_counts(vec![("110", 7), ("010", 7), ("001", 3)]).unwrap();
        assert_eq!(distribution.most_frequent(), ("010", 7));
    }

    #[test]
    fn test_value_bitstring_conversion() {
        assert_eq!(value_to_bitstring(5, 4).unwrap(), "0101");
        assert_eq!(bitstring_to_value("0101").unwrap(), 5);
        assert!(value_to_bitstring(16, 4).is_err());
        assert!(value_to_bitstring(0, 0).is_err());
    }

    #[test]
    fn test_huge_counts_overflow_into_an_error() {
        assert_eq!(
            MeasurementDistribution::from_counts(vec![("01", u64::MAX), ("01", 1)]),
            Err(MeasurementError::CountOverflow)
        );
        assert_eq!(
            MeasurementDistribution::from_counts(vec![("01", u64::MAX), ("10", 1)]),
            Err(MeasurementError::CountOverflow)
        );
    }

    #[test]
    fn test_serde_round_trip_preserves_counts() {
        let distribution = MeasurementDistribution::from_counts(vec![("01", 3), ("10", 1)]).unwrap();
        let json = serde_json::to_string(&distribution).unwrap();
        let restored: MeasurementDistribution = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, distribution);
    }

    #[test]
    fn test_deserialization_revalidates() {
        let empty = r#"{"bitstring_width":2,"bitstring_counts":{},"total_shots":0}"#;
        assert!(serde_json::from_str::<MeasurementDistribution>(empty).is_err());

        let mixed = r#"{"bitstring_width":2,"bitstring_counts":{"01":1,"011":1},"total_shots":2}"#;
        assert!(serde_json::from_str::<MeasurementDistribution>(mixed).is_err());

        let wrong_width = r#"{"bitstring_width":3,"bitstring_counts":{"01":1},"total_shots":1}"#;
        assert!(serde_json::from_str::<MeasurementDistribution>(wrong_width).is_err());

        let wrong_total = r#"{"bitstring_width":2,"bitstring_counts":{"01":3},"total_shots":7}"#;
        let err = serde_json::from_str::<MeasurementDistribution>(wrong_total).unwrap_err();
        assert!(err.to_string().contains("7"));
    }
}
