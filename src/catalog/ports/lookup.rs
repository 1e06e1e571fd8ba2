//! Read-only catalog lookup used during batch processing.

use super::CatalogMirrorError;
use crate::catalog::domain::{CatalogKind, MirrorEntry};
use crate::remote::domain::{ExternalId, RemoteError};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for catalog lookups and synchronization.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Resolves remote identifiers against the mirrored catalogs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Returns the active entry for `external_id`, or `None` when it is
    /// unknown or inactive.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the backing store cannot be read.
    async fn find_active(
        &self,
        kind: CatalogKind,
        external_id: ExternalId,
    ) -> CatalogResult<Option<MirrorEntry>>;
}

/// Errors raised by catalog lookup and synchronization.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// The mirror could not be read or written.
    #[error(transparent)]
    Mirror(#[from] CatalogMirrorError),

    /// The remote catalog could not be listed.
    #[error("remote catalog unavailable: {0}")]
    Remote(#[from] RemoteError),
}
