//! Persistence port for mirrored catalog entries.

use crate::catalog::domain::{CatalogKind, MirrorEntry};
use crate::remote::domain::ExternalId;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Result type for catalog mirror operations.
pub type CatalogMirrorResult<T> = Result<T, CatalogMirrorError>;

/// Catalog mirror persistence contract.
#[async_trait]
pub trait CatalogMirror: Send + Sync {
    /// Finds an entry by catalog and remote identifier, active or not.
    async fn find_by_external_id(
        &self,
        kind: CatalogKind,
        external_id: ExternalId,
    ) -> CatalogMirrorResult<Option<MirrorEntry>>;

    /// Stores a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogMirrorError::Duplicate`] when the entry already exists.
    async fn insert(&self, entry: &MirrorEntry) -> CatalogMirrorResult<()>;

    /// Replaces an existing entry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogMirrorError::NotFound`] when the entry does not exist.
    async fn update(&self, entry: &MirrorEntry) -> CatalogMirrorResult<()>;

    /// Marks active entries of `kind` whose identifier is not in `present` as
    /// inactive and returns how many were changed.
    async fn mark_inactive_if_absent(
        &self,
        kind: CatalogKind,
        present: &HashSet<ExternalId>,
    ) -> CatalogMirrorResult<usize>;

    /// Lists every entry of `kind` ordered by remote identifier.
    async fn list(&self, kind: CatalogKind) -> CatalogMirrorResult<Vec<MirrorEntry>>;
}

/// Errors returned by catalog mirror implementations.
#[derive(Debug, Clone, Error)]
pub enum CatalogMirrorError {
    /// An entry with the same catalog and identifier already exists.
    #[error("duplicate {kind} entry: {external_id}")]
    Duplicate {
        /// Catalog of the entry.
        kind: CatalogKind,
        /// Remote identifier of the entry.
        external_id: ExternalId,
    },

    /// The entry was not found.
    #[error("{kind} entry not found: {external_id}")]
    NotFound {
        /// Catalog of the entry.
        kind: CatalogKind,
        /// Remote identifier of the entry.
        external_id: ExternalId,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CatalogMirrorError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
