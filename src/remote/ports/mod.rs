//! Port contracts for remote-system access.
//!
//! Batch strategies and catalog synchronization depend on [`RemoteSystem`]
//! rather than on the HTTP adapter, so both can run against in-memory fakes.

pub mod remote_system;

pub use remote_system::RemoteSystem;

#[cfg(test)]
pub use remote_system::MockRemoteSystem;
