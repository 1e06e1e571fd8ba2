//! In-memory repository for execution records.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::batch::{
    domain::{ExecutionId, ExecutionItem, ExecutionRecord, PersistedExecutionData},
    ports::{ExecutionRepository, ExecutionRepositoryError, ExecutionRepositoryResult},
};

/// Thread-safe in-memory execution repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryExecutionRepository {
    state: Arc<RwLock<HashMap<ExecutionId, ExecutionRecord>>>,
}

impl InMemoryExecutionRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn len(&self) -> ExecutionRepositoryResult<usize> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.len())
    }

    /// Returns `true` when no record has been stored.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn is_empty(&self) -> ExecutionRepositoryResult<bool> {
        self.len().map(|count| count == 0)
    }
}

fn lock_error(err: impl std::fmt::Display) -> ExecutionRepositoryError {
    ExecutionRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ExecutionRepository for InMemoryExecutionRepository {
    async fn store(&self, record: &ExecutionRecord) -> ExecutionRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.contains_key(&record.id()) {
            return Err(ExecutionRepositoryError::Duplicate(record.id()));
        }
        state.insert(record.id(), record.clone());
        Ok(())
    }

    async fn append_item(
        &self,
        id: ExecutionId,
        item: &ExecutionItem,
    ) -> ExecutionRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .get_mut(&id)
            .ok_or(ExecutionRepositoryError::NotFound(id))?;
        stored.record(item.clone());
        Ok(())
    }

    async fn update_summary(&self, record: &ExecutionRecord) -> ExecutionRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .get_mut(&record.id())
            .ok_or(ExecutionRepositoryError::NotFound(record.id()))?;
        *stored = ExecutionRecord::from_persisted(PersistedExecutionData {
            id: record.id(),
            source: record.source().to_owned(),
            started_at: record.started_at(),
            finished_at: record.finished_at(),
            total_items: record.total_items(),
            items: stored.items().to_vec(),
        });
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: ExecutionId,
    ) -> ExecutionRepositoryResult<Option<ExecutionRecord>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.get(&id).cloned())
    }
}
