//! Port contracts for the catalog mirror.
//!
//! [`CatalogMirror`] is the persistence contract for mirrored entries.
//! [`CatalogLookup`] is the read-only view batch strategies depend on.

pub mod lookup;
pub mod mirror;

pub use lookup::{CatalogError, CatalogLookup, CatalogResult};
pub use mirror::{CatalogMirror, CatalogMirrorError, CatalogMirrorResult};

#[cfg(test)]
pub use lookup::MockCatalogLookup;
