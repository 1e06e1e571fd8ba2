//! REST adapter for the remote case-management API.
//!
//! Requests flow through three layers: [`TokenManager`] keeps one bearer
//! token fresh, [`RetryingHttpExecutor`] authenticates and retries each
//! request, and [`PaginatedCatalogLoader`] walks paginated collections.
//! [`RemoteSystemClient`] composes them into the [`RemoteSystem`] port.
//!
//! [`RemoteSystem`]: crate::remote::ports::RemoteSystem

mod client;
mod executor;
mod pagination;
mod token;

pub use client::RemoteSystemClient;
pub use executor::{RemoteRequest, RemoteResponse, RetryingHttpExecutor};
pub use pagination::{CatalogQuery, PaginatedCatalogLoader};
pub use token::TokenManager;
