//! Execution record aggregate.

use super::{ExecutionId, ExecutionItem, ItemStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Log of one batch execution.
///
/// `success_count + failure_count` never exceeds `total_items`; once the
/// record is finished the two are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    id: ExecutionId,
    source: String,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    total_items: usize,
    success_count: usize,
    failure_count: usize,
    items: Vec<ExecutionItem>,
}

/// Parameter object for reconstructing a persisted execution record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedExecutionData {
    /// Persisted execution identifier.
    pub id: ExecutionId,
    /// Source name the batch was submitted under.
    pub source: String,
    /// Start timestamp.
    pub started_at: DateTime<Utc>,
    /// Finish timestamp, absent while running.
    pub finished_at: Option<DateTime<Utc>>,
    /// Planned item count.
    pub total_items: usize,
    /// Recorded items in order.
    pub items: Vec<ExecutionItem>,
}

impl ExecutionRecord {
    /// Starts a record for a batch of `total_items` planned items.
    #[must_use]
    pub fn start(source: impl Into<String>, total_items: usize, clock: &impl Clock) -> Self {
        Self {
            id: ExecutionId::new(),
            source: source.into(),
            started_at: clock.utc(),
            finished_at: None,
            total_items,
            success_count: 0,
            failure_count: 0,
            items: Vec::new(),
        }
    }

    /// Reconstructs a record from persisted data, recounting item outcomes.
    #[must_use]
    pub fn from_persisted(data: PersistedExecutionData) -> Self {
        let success_count = count_status(&data.items, ItemStatus::Success);
        let failure_count = count_status(&data.items, ItemStatus::Failure);
        Self {
            id: data.id,
            source: data.source,
            started_at: data.started_at,
            finished_at: data.finished_at,
            total_items: data.total_items.max(success_count + failure_count),
            success_count,
            failure_count,
            items: data.items,
        }
    }

    /// Replaces the provisional item count once the real count is known.
    ///
    /// The count never drops below the number of items already recorded.
    pub fn correct_total(&mut self, total_items: usize) {
        self.total_items = total_items.max(self.recorded_count());
    }

    /// Appends an item outcome and updates the counters.
    ///
    /// Items beyond the planned count extend the total so the counters never
    /// exceed it.
    pub fn record(&mut self, item: ExecutionItem) {
        match item.status() {
            ItemStatus::Success => self.success_count += 1,
            ItemStatus::Failure => self.failure_count += 1,
            ItemStatus::Pending => {}
        }
        self.total_items = self.total_items.max(self.recorded_count());
        self.items.push(item);
    }

    /// Stamps the finish time and aligns the total with the recorded count.
    pub fn finish(&mut self, clock: &impl Clock) {
        self.total_items = self.recorded_count();
        self.finished_at = Some(clock.utc());
    }

    /// Returns the execution identifier.
    #[must_use]
    pub const fn id(&self) -> ExecutionId {
        self.id
    }

    /// Returns the source name the batch was submitted under.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the start timestamp.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the finish timestamp, absent while running.
    #[must_use]
    pub const fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Returns `true` once the record has been finished.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Returns the planned item count.
    #[must_use]
    pub const fn total_items(&self) -> usize {
        self.total_items
    }

    /// Returns the number of successful items.
    #[must_use]
    pub const fn success_count(&self) -> usize {
        self.success_count
    }

    /// Returns the number of failed items.
    #[must_use]
    pub const fn failure_count(&self) -> usize {
        self.failure_count
    }

    /// Returns the number of items with a final status.
    #[must_use]
    pub const fn recorded_count(&self) -> usize {
        self.success_count + self.failure_count
    }

    /// Returns recorded items in order.
    #[must_use]
    pub fn items(&self) -> &[ExecutionItem] {
        &self.items
    }

    /// Returns failed items in order.
    pub fn failed_items(&self) -> impl Iterator<Item = &ExecutionItem> {
        self.items
            .iter()
            .filter(|item| item.status() == ItemStatus::Failure)
    }
}

fn count_status(items: &[ExecutionItem], status: ItemStatus) -> usize {
    items.iter().filter(|item| item.status() == status).count()
}
