//! Repository port for execution record persistence.

use crate::batch::domain::{ExecutionId, ExecutionItem, ExecutionRecord};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for execution repository operations.
pub type ExecutionRepositoryResult<T> = Result<T, ExecutionRepositoryError>;

/// Execution record persistence contract.
#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    /// Stores a new execution record.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionRepositoryError::Duplicate`] when the identifier
    /// already exists.
    async fn store(&self, record: &ExecutionRecord) -> ExecutionRepositoryResult<()>;

    /// Appends one item outcome to a stored record and updates its counters.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionRepositoryError::NotFound`] when the record does not
    /// exist.
    async fn append_item(
        &self,
        id: ExecutionId,
        item: &ExecutionItem,
    ) -> ExecutionRepositoryResult<()>;

    /// Persists the record's totals, counters, and finish timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionRepositoryError::NotFound`] when the record does not
    /// exist.
    async fn update_summary(&self, record: &ExecutionRecord) -> ExecutionRepositoryResult<()>;

    /// Finds a record by identifier, including its items.
    ///
    /// Returns `None` when the record does not exist.
    async fn find_by_id(
        &self,
        id: ExecutionId,
    ) -> ExecutionRepositoryResult<Option<ExecutionRecord>>;
}

/// Errors returned by execution repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ExecutionRepositoryError {
    /// A record with the same identifier already exists.
    #[error("duplicate execution identifier: {0}")]
    Duplicate(ExecutionId),

    /// The record was not found.
    #[error("execution not found: {0}")]
    NotFound(ExecutionId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ExecutionRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
