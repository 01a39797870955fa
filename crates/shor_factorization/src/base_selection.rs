// =============================================================================
// Shor Factorization - Base Selection
// =============================================================================
// Table of Contents:
//   1. BaseSelector - Source of candidate bases
//   2. RandomBaseSelector - Uniform draws from [2, N-1]
//   3. SequenceBaseSelector - Scripted bases
// =============================================================================

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// =============================================================================
// 1. BaseSelector
// =============================================================================

/// Supplies one base per attempt. The search loop rejects anything outside
/// `[2, target - 1]`.
pub trait BaseSelector: Send {
    fn select_base(&mut self, target: u64) -> u64;
}

// =============================================================================
// 2. RandomBaseSelector
// =============================================================================

#[derive(Debug, Clone)]
pub struct RandomBaseSelector {
    rng: StdRng,
}

impl Default for RandomBaseSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomBaseSelector {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded from `seed` when given, from entropy otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::with_seed)
    }
}

impl BaseSelector for RandomBaseSelector {
    fn select_base(&mut self, target: u64) -> u64 {
        if target < 4 {
            // [2, target - 1] holds at most the single value 2.
            return 2;
        }
        self.rng.gen_range(2..target)
    }
}

// =============================================================================
// 3. SequenceBaseSelector
// =============================================================================

/// Replays a fixed list of bases, cycling when it runs out.
#[derive(Debug, Clone)]
pub struct SequenceBaseSelector {
    bases: Vec<u64>,
    position: usize,
}

impl SequenceBaseSelector {
    pub fn new(bases: impl Into<Vec<u64>>) -> Self {
        Self {
            bases: bases.into(),
            position: 0,
        }
    }
}

impl BaseSelector for SequenceBaseSelector {
    fn select_base(&mut self, _target: u64) -> u64 {
        if self.bases.is_empty() {
            return 0;
        }
        let base = self.bases[self.position % self.bases.len()];
        self.position += 1;
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bases_stay_in_range() {
        let mut selector = RandomBaseSelector::with_seed(17);
        for _ in 0..1000 {
            let base = selector.select_base(21);
            assert!((2..=20).contains(&base));
        }
    }

    #[test]
    fn test_seeded_selectors_repeat() {
        let mut first = RandomBaseSelector::with_seed(99);
        let mut second = RandomBaseSelector::with_seed(99);
        let a: Vec<u64> = (0..16).map(|_| first.select_base(1_000_003)).collect();
        let b: Vec<u64> = (0..16).map(|_| second.select_base(1_000_003)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sequence_cycles() {
        let mut selector = SequenceBaseSelector::new(vec![4, 7]);
        let drawn: Vec<u64> = (0..5).map(|_| selector.select_base(15)).collect();
        assert_eq!(drawn, vec![4, 7, 4, 7, 4]);
    }
}
