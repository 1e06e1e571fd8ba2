//! Access to the remote case-management system.
//!
//! The remote system exposes an OData-flavoured REST API guarded by OAuth2
//! client-credentials tokens. This module keeps a process-wide bearer token
//! fresh, retries transient failures with exponential backoff, walks
//! paginated catalog collections, and exposes the handful of operations the
//! batch pipeline needs. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
