//! Local mirror of the remote reference catalogs.
//!
//! Offices, users, and task types are copied from the remote system into a
//! mirror so batch processing can validate references without a remote call
//! per item. A time-bounded cache sits in front of the mirror and refreshes
//! whole catalogs once they go stale. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Synchronization and lookup services in [`services`]
//! - The generic cache in [`cache`]

pub mod adapters;
pub mod cache;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
