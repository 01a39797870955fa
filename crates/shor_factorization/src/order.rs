// =============================================================================
// Shor Factorization - Order Resolution
// =============================================================================
// Table of Contents:
//   1. OrderCandidate
//   2. OrderResolutionStrategy
//   3. OrderResolver - Phase estimate → order candidate
// =============================================================================
// Purpose: Turns k / 2^w ≈ s / r into a guess for r. The guess is unchecked;
//          the search loop validates it against the modulus.
// =============================================================================

use crate::phase::{PhaseEstimate, PhaseExtractionError};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// 1. OrderCandidate
// =============================================================================

/// A positive guess for the multiplicative order of a base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderCandidate(u64);

impl OrderCandidate {
    pub fn new(order: u64) -> Option<Self> {
        (order > 0).then_some(Self(order))
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_even(&self) -> bool {
        self.0 % 2 == 0
    }
}

impl fmt::Display for OrderCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// 2. OrderResolutionStrategy
// =============================================================================

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum OrderResolutionStrategy {
    /// `⌊2^w / k⌋`.
    Truncation,
    /// Denominator of the last continued-fraction convergent of `k / 2^w`
    /// that is still below the modulus.
    #[default]
    ContinuedFraction,
}

// =============================================================================
// 3. OrderResolver
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct OrderResolver {
    strategy: OrderResolutionStrategy,
    modulus: u64,
}

impl OrderResolver {
    pub fn new(strategy: OrderResolutionStrategy, modulus: u64) -> Self {
        Self { strategy, modulus }
    }

    pub fn resolve_order(&self, phase: &PhaseEstimate) -> Result<OrderCandidate, PhaseExtractionError> {
        if phase.is_zero() {
            return Err(PhaseExtractionError::PhaseZero);
        }
        let order = match self.strategy {
            OrderResolutionStrategy::Truncation => phase.denominator() / phase.numerator(),
            OrderResolutionStrategy::ContinuedFraction => {
                convergent_denominator_below(phase.numerator(), phase.denominator(), self.modulus)
            }
        };
        // Both strategies yield at least 1 for a phase in (0, 1).
        OrderCandidate::new(order).ok_or(PhaseExtractionError::PhaseZero)
    }
}

/// Denominator of the last convergent of `numerator / denominator` whose
/// denominator is below `bound` (at least 1).
fn convergent_denominator_below(numerator: u64, denominator: u64, bound: u64) -> u64 {
    let (mut num, mut den) = (numerator as u128, denominator as u128);
    let bound = bound as u128;
    // q_{n-2}, q_{n-1}
    let (mut q_prev, mut q_curr) = (1u128, 0u128);
    let mut best = 1u128;

    while den != 0 {
        let a = num / den;
        let q_next = a * q_curr + q_prev;
        if q_next >= bound {
            break;
        }
        best = q_next;
        q_prev = q_curr;
        q_curr = q_next;
        (num, den) = (den, num % den);
    }
    best.max(1) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(numerator: u64, width: usize) -> PhaseEstimate {
        PhaseEstimate::new(numerator, width).unwrap()
    }

    #[test]
    fn test_truncation_matches_integer_division() {
        let resolver = OrderResolver::new(OrderResolutionStrategy::Truncation, 15);
        assert_eq!(resolver.resolve_order(&phase(64, 8)).unwrap().value(), 4);
        assert_eq!(resolver.resolve_order(&phase(192, 8)).unwrap().value(), 1);
        assert_eq!(resolver.resolve_order(&phase(3, 4)).unwrap().value(), 5);
    }

    #[test]
    fn test_continued_fraction_recovers_order_from_three_quarters() {
        let resolver = OrderResolver::new(OrderResolutionStrategy::ContinuedFraction, 15);
        assert_eq!(resolver.resolve_order(&phase(192, 8)).unwrap().value(), 4);
        assert_eq!(resolver.resolve_order(&phase(64, 8)).unwrap().value(), 4);
        assert_eq!(resolver.resolve_order(&phase(128, 8)).unwrap().value(), 2);
    }

    #[test]
    fn test_continued_fraction_respects_modulus_bound() {
        // 171/1024 ≈ 1/6: convergents 1/5, 1/6, 85/509; below 21 the last is 6.
        let resolver = OrderResolver::new(OrderResolutionStrategy::ContinuedFraction, 21);
        assert_eq!(resolver.resolve_order(&phase(171, 10)).unwrap().value(), 6);
    }

    #[test]
    fn test_zero_phase_rejected() {
        let resolver = OrderResolver::new(OrderResolutionStrategy::default(), 15);
        assert_eq!(
            resolver.resolve_order(&phase(0, 8)),
            Err(PhaseExtractionError::PhaseZero)
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let resolver = OrderResolver::new(OrderResolutionStrategy::ContinuedFraction, 35);
        let estimate = phase(437, 12);
        assert_eq!(
            resolver.resolve_order(&estimate).unwrap(),
            resolver.resolve_order(&estimate).unwrap()
        );
    }

    #[test]
    fn test_strategy_serde_names() {
        assert_eq!(
            serde_json::to_string(&OrderResolutionStrategy::ContinuedFraction).unwrap(),
            "\"continued-fraction\""
        );
    }
}
