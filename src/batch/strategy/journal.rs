//! Incremental persistence of item outcomes.

use super::CancellationFlag;
use crate::batch::domain::{BatchItem, ExecutionItem, ExecutionRecord};
use crate::batch::ports::{ExecutionRepository, ExecutionRepositoryResult};
use tracing::warn;

/// Write handle on one running execution record.
///
/// Every recorded item is persisted before the in-memory record is updated,
/// so the stored log never lags behind the counters a strategy reports.
/// Holding the record through `&mut` serializes all writes to it.
pub struct ExecutionJournal<'a> {
    record: &'a mut ExecutionRecord,
    repository: &'a dyn ExecutionRepository,
    planned: Vec<BatchItem>,
    cancellation: CancellationFlag,
}

impl<'a> ExecutionJournal<'a> {
    /// Opens a journal on a stored record.
    #[must_use]
    pub fn new(
        record: &'a mut ExecutionRecord,
        repository: &'a dyn ExecutionRepository,
        planned: Vec<BatchItem>,
        cancellation: CancellationFlag,
    ) -> Self {
        Self {
            record,
            repository,
            planned,
            cancellation,
        }
    }

    /// Replaces the planned items and corrects the record total to match.
    ///
    /// # Errors
    ///
    /// Returns the repository error when the corrected summary cannot be
    /// persisted.
    pub async fn plan(&mut self, items: &[BatchItem]) -> ExecutionRepositoryResult<()> {
        self.planned = items.to_vec();
        self.record.correct_total(items.len());
        self.repository.update_summary(&*self.record).await
    }

    /// Persists an item outcome and adds it to the record.
    ///
    /// # Errors
    ///
    /// Returns the repository error when the item cannot be appended; the
    /// record is left unchanged.
    pub async fn record(&mut self, item: ExecutionItem) -> ExecutionRepositoryResult<()> {
        self.repository.append_item(self.record.id(), &item).await?;
        self.record.record(item);
        Ok(())
    }

    /// Returns `true` once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Returns the items planned for this execution.
    #[must_use]
    pub fn planned(&self) -> &[BatchItem] {
        &self.planned
    }

    /// Records every planned item without an outcome as a failure.
    ///
    /// All items are added to the record even when persisting one fails.
    ///
    /// # Errors
    ///
    /// Returns the first repository error met.
    pub(crate) async fn fail_remaining(
        &mut self,
        message: &str,
    ) -> ExecutionRepositoryResult<usize> {
        let remaining: Vec<ExecutionItem> = self
            .planned
            .iter()
            .enumerate()
            .skip(self.record.items().len())
            .map(|(position, item)| {
                ExecutionItem::failed(item.business_key(position), item.clone(), message)
            })
            .collect();
        let count = remaining.len();
        let mut first_error = None;
        for item in remaining {
            if let Err(err) = self.repository.append_item(self.record.id(), &item).await {
                warn!(
                    execution_id = %self.record.id(),
                    business_key = item.business_key(),
                    error = %err,
                    "could not persist failed item"
                );
                first_error.get_or_insert(err);
            }
            self.record.record(item);
        }
        first_error.map_or(Ok(count), Err)
    }
}
