//! Accord Test Harness - Simulation and fuzzing tools for the engine
//!
//! This crate provides:
//! - Scripted remote-call simulation (stands in for the RPC collaborators
//!   that settle resolvers after the fact)
//! - Randomized operation-sequence fuzzing with lifecycle invariant checks
//! - End-to-end chain scenarios
//! - Benchmarks

pub mod remote_sim;
pub mod scenarios;
pub mod settle_fuzzer;

pub use remote_sim::*;
pub use scenarios::*;
pub use settle_fuzzer::*;
