// =============================================================================
// Shor Factorization - Quantum Runtime
// =============================================================================
// Table of Contents:
//   1. Module Declarations
//   2. Prelude Module
// =============================================================================
// Purpose: Quantum runtime layer providing the circuit IR, dense state vector
//          backend, seeded execution engine, measurement distributions and
//          cooperative cancellation used by the order-finding devices.
// =============================================================================

pub mod async_runtime;
pub mod circuit_program;
pub mod error;
pub mod execution;
pub mod gate_operations;
pub mod measurement;
pub mod state_backend;

pub mod prelude {
    pub use crate::async_runtime::*;
    pub use crate::circuit_program::*;
    pub use crate::error::*;
    pub use crate::execution::*;
    pub use crate::gate_operations::*;
    pub use crate::measurement::*;
    pub use crate::state_backend::*;
}
