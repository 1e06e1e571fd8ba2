//! Adapters for the remote-system port.
//!
//! # Available Adapters
//!
//! - [`http::RemoteSystemClient`]: REST client with token management, retry,
//!   and pagination
//! - [`memory::InMemoryRemoteSystem`]: Scriptable fake for tests and dry runs

pub mod http;
pub mod memory;
