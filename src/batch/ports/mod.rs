//! Port contracts for batch execution tracking.
//!
//! Ports define infrastructure-agnostic interfaces used by batch services.

pub mod repository;

pub use repository::{ExecutionRepository, ExecutionRepositoryError, ExecutionRepositoryResult};
