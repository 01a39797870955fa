// =============================================================================
// Shor Factorization - Classical Control
// =============================================================================
// Table of Contents:
//   1. Module Declarations
//   2. Re-exports
//   3. Prelude Module
// =============================================================================
// Purpose: Drives Shor's factoring procedure around a quantum order-finding
//          collaborator: base selection, classical shortcuts, phase
//          extraction, order resolution and bounded retries.
// =============================================================================

pub mod arithmetic;
pub mod base_selection;
pub mod config;
pub mod error;
pub mod factorizer;
pub mod order;
pub mod parallel;
pub mod phase;
pub mod pipeline;
pub mod search;

pub use error::{FactorizationError, FactorizationResult};
pub use factorizer::{FactorizationReport, Factorizer, factorize};

pub mod prelude {
    pub use crate::base_selection::*;
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::factorizer::*;
    pub use crate::order::*;
    pub use crate::parallel::*;
    pub use crate::phase::*;
    pub use crate::pipeline::*;
    pub use crate::search::*;
}
