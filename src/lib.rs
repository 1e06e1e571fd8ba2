//! Casebridge: batch task creation against a legal case-management system.
//!
//! The crate authenticates against the remote case-management REST API,
//! mirrors its reference catalogs locally, and creates tasks in bulk from
//! several intake sources while recording a per-item execution log.
//!
//! # Architecture
//!
//! Casebridge follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (HTTP, in-memory, etc.)
//!
//! # Modules
//!
//! - [`remote`]: Authenticated, retrying access to the remote system
//! - [`catalog`]: Local catalog mirror and time-bounded lookup cache
//! - [`batch`]: Source-specific batch strategies and execution tracking
//! - [`rules`]: Co-requisite validation for task subtype selections
//! - [`config`]: Integration settings loaded from the environment
//! - [`telemetry`]: Tracing subscriber installation

pub mod batch;
pub mod catalog;
pub mod config;
pub mod remote;
pub mod rules;
pub mod telemetry;

#[cfg(test)]
mod test_support;
