// =============================================================================
// Shor Factorization - Factor Search Loop
// =============================================================================
// Table of Contents:
//   1. FactorPair - Validated non-trivial factorization
//   2. Search bookkeeping (ResolutionPath, SearchStatistics, SearchOutcome)
//   3. Classical pre-checks
//   4. Order validation
//   5. FactorSearchLoop - SelectBase → ShortcutCheck → OrderFinding →
//      ValidateOrder → Success | Retry
// =============================================================================

use crate::arithmetic::{gcd, is_prime, mod_pow, perfect_power};
use crate::base_selection::BaseSelector;
use crate::error::{AttemptFailure, FactorizationError, FactorizationResult, NotFactorableReason};
use crate::order::OrderCandidate;
use crate::pipeline::{OrderFindingOutcome, OrderFindingPipeline};
use quantum_runtime::async_runtime::CancellationToken;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use uuid::Uuid;

// =============================================================================
// 1. FactorPair
// =============================================================================

/// `factor1 · factor2 == target` with both factors above 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorPair {
    factor1: u64,
    factor2: u64,
}

impl FactorPair {
    pub fn new(factor1: u64, factor2: u64, target: u64) -> Option<Self> {
        let valid = factor1 > 1
            && factor2 > 1
            && factor1 as u128 * factor2 as u128 == target as u128;
        valid.then_some(Self { factor1, factor2 })
    }

    /// Pairs `divisor` with its cofactor when it is a proper divisor of `target`.
    pub fn from_divisor(divisor: u64, target: u64) -> Option<Self> {
        if divisor <= 1 || divisor >= target || target % divisor != 0 {
            return None;
        }
        Self::new(divisor, target / divisor, target)
    }

    pub fn factor1(&self) -> u64 {
        self.factor1
    }

    pub fn factor2(&self) -> u64 {
        self.factor2
    }

    pub fn product(&self) -> u128 {
        self.factor1 as u128 * self.factor2 as u128
    }
}

impl fmt::Display for FactorPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {}", self.factor1, self.factor2)
    }
}

// =============================================================================
// 2. Search bookkeeping
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPath {
    EvenShortcut,
    PerfectPower,
    GcdShortcut,
    OrderFinding,
}

/// Current step of one search; logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    SelectBase,
    ShortcutCheck { base: u64 },
    OrderFinding { base: u64 },
    ValidateOrder { base: u64, order: OrderCandidate },
    Success {
        pair: FactorPair,
        resolution: ResolutionPath,
        base: u64,
        order: Option<OrderCandidate>,
    },
    Retry(AttemptFailure),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStatistics {
    pub attempts: u32,
    pub quantum_invocations: u32,
    pub phase_zero: u32,
    pub odd_order: u32,
    pub trivial_factors: u32,
}

impl SearchStatistics {
    fn record_failure(&mut self, failure: AttemptFailure) {
        match failure {
            AttemptFailure::PhaseZero => self.phase_zero += 1,
            AttemptFailure::OddOrder(_) => self.odd_order += 1,
            AttemptFailure::TrivialFactors { .. } => self.trivial_factors += 1,
        }
    }

    pub fn merge(&mut self, other: &SearchStatistics) {
        self.attempts += other.attempts;
        self.quantum_invocations += other.quantum_invocations;
        self.phase_zero += other.phase_zero;
        self.odd_order += other.odd_order;
        self.trivial_factors += other.trivial_factors;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub search_id: Uuid,
    pub target: u64,
    pub pair: FactorPair,
    pub resolution: ResolutionPath,
    /// Base of the successful attempt, if the loop ran.
    pub base: Option<u64>,
    /// Validated order, for `OrderFinding` resolutions.
    pub order: Option<u64>,
    pub statistics: SearchStatistics,
}

// =============================================================================
// 3. Classical pre-checks
// =============================================================================

/// Settles `target` without order finding where possible: rejects values
/// below 2 and primes, splits even numbers and perfect powers. `Ok(None)`
/// means the search loop is needed.
pub fn classify_target(target: u64) -> FactorizationResult<Option<(FactorPair, ResolutionPath)>> {
    if target < 2 {
        return Err(FactorizationError::NotFactorable {
            target,
            reason: NotFactorableReason::BelowTwo,
        });
    }
    if target == 2 || target == 3 {
        return Err(FactorizationError::NotFactorable {
            target,
            reason: NotFactorableReason::Prime,
        });
    }
    if target % 2 == 0 {
        return Ok(FactorPair::from_divisor(2, target).map(|p| (p, ResolutionPath::EvenShortcut)));
    }
    if is_prime(target) {
        return Err(FactorizationError::NotFactorable {
            target,
            reason: NotFactorableReason::Prime,
        });
    }
    if let Some((root, _)) = perfect_power(target) {
        return Ok(FactorPair::from_divisor(root, target).map(|p| (p, ResolutionPath::PerfectPower)));
    }
    Ok(None)
}

// =============================================================================
// 4. Order validation
// =============================================================================

/// Derives factors from an order candidate: `gcd(a^(r/2) ∓ 1, N)`. Both
/// gcds must be proper divisors. Their product can fall short of `N` only
/// when `N` has three or more prime factors; the first gcd is then paired
/// with its cofactor.
pub fn validate_order(base: u64, order: OrderCandidate, target: u64) -> Result<FactorPair, AttemptFailure> {
    let r = order.value();
    if !order.is_even() {
        return Err(AttemptFailure::OddOrder(r));
    }

    let half_power = mod_pow(base, r / 2, target);
    let minus_one = if half_power == 0 { target - 1 } else { half_power - 1 };
    let factor1 = gcd(minus_one, target);
    let factor2 = gcd(half_power + 1, target);

    let proper = |f: u64| f > 1 && f < target;
    if !(proper(factor1) && proper(factor2)) {
        return Err(AttemptFailure::TrivialFactors { order: r });
    }

    FactorPair::new(factor1, factor2, target)
        .or_else(|| FactorPair::from_divisor(factor1, target))
        .ok_or(AttemptFailure::TrivialFactors { order: r })
}

// =============================================================================
// 5. FactorSearchLoop
// =============================================================================

#[derive(Debug, Clone)]
pub struct FactorSearchLoop {
    pipeline: OrderFindingPipeline,
    max_attempts: u32,
    max_duration: Option<Duration>,
    cancellation: Option<CancellationToken>,
}

impl FactorSearchLoop {
    pub fn new(pipeline: OrderFindingPipeline) -> Self {
        Self {
            pipeline,
            max_attempts: crate::config::DEFAULT_MAX_ATTEMPTS,
            max_duration: None,
            cancellation: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_max_duration(mut self, max_duration: Option<Duration>) -> Self {
        self.max_duration = max_duration;
        self
    }

    /// Stops the loop before its next base selection once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn run(&self, target: u64, selector: &mut dyn BaseSelector) -> FactorizationResult<SearchOutcome> {
        let search_id = Uuid::new_v4();
        if let Some((pair, resolution)) = classify_target(target)? {
            tracing::info!(%search_id, target, %pair, ?resolution, "factored without order finding");
            return Ok(SearchOutcome {
                search_id,
                target,
                pair,
                resolution,
                base: None,
                order: None,
                statistics: SearchStatistics::default(),
            });
        }
        self.search(search_id, target, selector)
    }

    /// The retry loop proper. `target` must be odd, composite and not a
    /// perfect power for order finding to be meaningful.
    pub fn search(
        &self,
        search_id: Uuid,
        target: u64,
        selector: &mut dyn BaseSelector,
    ) -> FactorizationResult<SearchOutcome> {
        let mut statistics = SearchStatistics::default();
        self.search_recording(search_id, target, selector, &mut statistics)
    }

    /// Like `search`, but leaves the counters in `statistics` whether the
    /// search succeeds, fails or is cancelled.
    pub fn search_recording(
        &self,
        search_id: Uuid,
        target: u64,
        selector: &mut dyn BaseSelector,
        statistics: &mut SearchStatistics,
    ) -> FactorizationResult<SearchOutcome> {
        let start_time = Instant::now();
        let mut state = SearchState::SelectBase;

        loop {
            tracing::trace!(%search_id, ?state, "search transition");
            state = match state {
                SearchState::SelectBase => {
                    if self.cancellation.as_ref().is_some_and(|t| t.is_cancelled()) {
                        tracing::debug!(%search_id, attempts = statistics.attempts, "search cancelled");
                        return Err(FactorizationError::Cancelled);
                    }
                    let elapsed = start_time.elapsed();
                    let out_of_time = self.max_duration.is_some_and(|limit| elapsed >= limit);
                    if statistics.attempts >= self.max_attempts || out_of_time {
                        tracing::warn!(
                            %search_id,
                            target,
                            attempts = statistics.attempts,
                            elapsed_ms = elapsed.as_millis() as u64,
                            "search budget exhausted"
                        );
                        return Err(FactorizationError::FactorizationFailed {
                            target,
                            attempts: statistics.attempts,
                            elapsed_ms: elapsed.as_millis() as u64,
                        });
                    }

                    statistics.attempts += 1;
                    let base = selector.select_base(target);
                    if base < 2 || base >= target {
                        tracing::warn!(%search_id, base, target, "base selector out of range");
                        return Err(FactorizationError::InvalidBase { base, target });
                    }
                    tracing::debug!(%search_id, attempt = statistics.attempts, base, "base selected");
                    SearchState::ShortcutCheck { base }
                }

                SearchState::ShortcutCheck { base } => {
                    let divisor = gcd(base, target);
                    match FactorPair::from_divisor(divisor, target) {
                        Some(pair) => SearchState::Success {
                            pair,
                            resolution: ResolutionPath::GcdShortcut,
                            base,
                            order: None,
                        },
                        None => SearchState::OrderFinding { base },
                    }
                }

                SearchState::OrderFinding { base } => {
                    statistics.quantum_invocations += 1;
                    match self.pipeline.find_order(base, target) {
                        Ok(OrderFindingOutcome::Order { order, .. }) => {
                            SearchState::ValidateOrder { base, order }
                        }
                        Ok(OrderFindingOutcome::PhaseZero) => SearchState::Retry(AttemptFailure::PhaseZero),
                        Err(err) => {
                            tracing::warn!(%search_id, base, target, error = %err, "order finding failed");
                            return Err(err);
                        }
                    }
                }

                SearchState::ValidateOrder { base, order } => match validate_order(base, order, target) {
                    Ok(pair) => SearchState::Success {
                        pair,
                        resolution: ResolutionPath::OrderFinding,
                        base,
                        order: Some(order),
                    },
                    Err(failure) => SearchState::Retry(failure),
                },

                SearchState::Success {
                    pair,
                    resolution,
                    base,
                    order,
                } => {
                    tracing::info!(
                        %search_id,
                        target,
                        base,
                        %pair,
                        ?resolution,
                        attempts = statistics.attempts,
                        elapsed_ms = start_time.elapsed().as_millis() as u64,
                        "factors found"
                    );
                    return Ok(SearchOutcome {
                        search_id,
                        target,
                        pair,
                        resolution,
                        base: Some(base),
                        order: order.map(|o| o.value()),
                        statistics: *statistics,
                    });
                }

                SearchState::Retry(failure) => {
                    statistics.record_failure(failure);
                    tracing::debug!(%search_id, attempt = statistics.attempts, %failure, "retrying with a new base");
                    SearchState::SelectBase
                }
            };
        }
    }
}
