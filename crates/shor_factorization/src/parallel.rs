// =============================================================================
// Shor Factorization - Parallel Factor Search
// =============================================================================
// Table of Contents:
//   1. ParallelFactorSearch - Independent search loops on blocking workers
//   2. Attempt budget split
// =============================================================================
// Purpose: Runs several search loops at once, each with its own base
//          sequence. The first loop to find factors cancels the rest through
//          a shared token.
// =============================================================================

use crate::base_selection::RandomBaseSelector;
use crate::error::{FactorizationError, FactorizationResult};
use crate::pipeline::OrderFindingPipeline;
use crate::search::{FactorSearchLoop, SearchOutcome, SearchStatistics, classify_target};
use quantum_runtime::async_runtime::CancellationToken;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use uuid::Uuid;

// =============================================================================
// 1. ParallelFactorSearch
// =============================================================================

#[derive(Debug, Clone)]
pub struct ParallelFactorSearch {
    pipeline: OrderFindingPipeline,
    workers: usize,
    max_attempts: u32,
    max_duration: Option<Duration>,
    seed: Option<u64>,
}

impl ParallelFactorSearch {
    pub fn new(pipeline: OrderFindingPipeline, workers: usize) -> Self {
        Self {
            pipeline,
            workers: workers.max(1),
            max_attempts: crate::config::DEFAULT_MAX_ATTEMPTS,
            max_duration: None,
            seed: None,
        }
    }

    /// Total attempts across all workers.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_max_duration(mut self, max_duration: Option<Duration>) -> Self {
        self.max_duration = max_duration;
        self
    }

    /// Worker `i` draws bases from `seed + i`.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub async fn run(&self, target: u64) -> FactorizationResult<SearchOutcome> {
        let search_id = Uuid::new_v4();
        if let Some((pair, resolution)) = classify_target(target)? {
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

        let start_time = Instant::now();
        let token = CancellationToken::new();
        let budgets = split_budget(self.max_attempts, self.workers);
        tracing::debug!(%search_id, target, workers = budgets.len(), "starting parallel search");

        let mut workers = JoinSet::new();
        for (index, budget) in budgets.into_iter().enumerate() {
            let search = FactorSearchLoop::new(self.pipeline.clone())
                .with_max_attempts(budget)
                .with_max_duration(self.max_duration)
                .with_cancellation(token.child_token());
            let mut selector = match self.seed {
                Some(seed) => RandomBaseSelector::with_seed(seed.wrapping_add(index as u64)),
                None => RandomBaseSelector::new(),
            };
            workers.spawn_blocking(move || {
                let mut statistics = SearchStatistics::default();
                let result = search.search_recording(search_id, target, &mut selector, &mut statistics);
                (result, statistics)
            });
        }

        // Every worker is drained so the totals cover attempts made after
        // the winner was found.
        let mut totals = SearchStatistics::default();
        let mut winner: Option<SearchOutcome> = None;
        while let Some(joined) = workers.join_next().await {
            let (result, statistics) = joined.map_err(|join_error| {
                token.cancel();
                FactorizationError::WorkerFailed(join_error.to_string())
            })?;
            totals.merge(&statistics);

            match result {
                Ok(outcome) => {
                    if winner.is_none() {
                        token.cancel();
                        winner = Some(outcome);
                    }
                }
                Err(FactorizationError::FactorizationFailed { .. } | FactorizationError::Cancelled) => {}
                Err(err) => {
                    if winner.is_none() {
                        token.cancel();
                        return Err(err);
                    }
                }
            }
        }

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        if let Some(mut outcome) = winner {
            outcome.statistics = totals;
            tracing::debug!(
                %search_id,
                target,
                attempts = totals.attempts,
                quantum_invocations = totals.quantum_invocations,
                elapsed_ms,
                "parallel search finished"
            );
            return Ok(outcome);
        }

        tracing::warn!(%search_id, target, attempts = totals.attempts, elapsed_ms, "all search workers exhausted");
        Err(FactorizationError::FactorizationFailed {
            target,
            attempts: totals.attempts,
            elapsed_ms,
        })
    }
}

// =============================================================================
// 2. Attempt budget split
// =============================================================================

/// Splits `total` attempts over at most `workers` loops, each getting at
/// least one attempt.
fn split_budget(total: u32, workers: usize) -> Vec<u32> {
    let workers = workers.clamp(1, total.max(1) as usize) as u32;
    let share = total / workers;
    let remainder = total % workers;
    (0..workers).map(|i| share + u32::from(i < remainder)).collect()
}
