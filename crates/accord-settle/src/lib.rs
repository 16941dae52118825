//! Accord Settle - The settlement engine
//!
//! This crate implements the settlement engine:
//! - Settlement value containers and their one-shot resolvers
//! - Continuation registration and derived-settlement chaining
//! - Chained-resolution flattening through the Awaitable capability
//! - Multi-input combinators (any / every / some)
//!
//! The engine is single-threaded and callback-driven. Deferred
//! notification goes through an injected [`accord_dispatch::DispatchQueue`]
//! that the host drains explicitly.

pub mod awaitable;
pub mod combine;
pub mod resolver;
pub mod settlement;

pub use awaitable::*;
pub use combine::*;
pub use resolver::*;
pub use settlement::*;
