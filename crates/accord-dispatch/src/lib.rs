//! Accord Dispatch - Deferred notification primitive
//!
//! This crate implements the queue the settlement engine defers
//! notifications through:
//! - Explicit FIFO task queue with shared handles
//! - Deterministic draining (run_next / run_until_idle) so hosts and tests
//!   control exactly when deferred work runs

pub mod queue;

pub use queue::*;
