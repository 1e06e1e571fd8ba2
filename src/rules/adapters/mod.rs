//! Adapters for the rule repository port.
//!
//! # Available Adapters
//!
//! - [`memory::InMemoryCoRequisiteRuleRepository`]: Thread-safe in-memory
//!   rule store for tests and fixed rule sets

pub mod memory;
