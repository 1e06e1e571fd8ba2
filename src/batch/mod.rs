//! Batch task creation with per-item execution tracking.
//!
//! A batch arrives from one intake source, is routed to the strategy
//! registered for that source, and produces one remote task per item. Every
//! item outcome is appended to an execution record as soon as it is known,
//! so a crash mid-batch leaves an accurate partial log. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Source-specific processing in [`strategy`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
pub mod strategy;

#[cfg(test)]
mod tests;
