//! Adapters for the catalog mirror ports.
//!
//! # Available Adapters
//!
//! - [`memory::InMemoryCatalogMirror`]: Thread-safe in-memory mirror that
//!   also answers lookups directly

pub mod memory;
