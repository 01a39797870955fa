// =============================================================================
// Shor Factorization - Async Runtime Support
// =============================================================================
// Table of Contents:
//   1. CancellationToken - Cooperative cancellation across workers
// =============================================================================
// Purpose: Lets a coordinator stop sibling search workers once one of them
//          has produced an answer. Workers poll `is_cancelled` between steps,
//          so the token works the same from blocking and async code.
// =============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// =============================================================================
// 1. CancellationToken
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// A token sharing this token's cancellation state.
    pub fn child_token(&self) -> CancellationToken {
        CancellationToken {
            cancelled: self.cancelled.clone(),
        }
    }
}
