//! Public runtime API surface.
//!
//! Gathers the error types exposed to consumers of the runtime crate so the
//! orchestration modules can stay focused on behaviour.

pub mod errors;

pub use errors::{CoordinatorError, InitError, ReconcileError, SaveError};
