//! Adapters for the batch ports.
//!
//! # Available Adapters
//!
//! - [`memory::InMemoryExecutionRepository`]: Thread-safe in-memory storage
//!   for tests and dry runs

pub mod memory;
