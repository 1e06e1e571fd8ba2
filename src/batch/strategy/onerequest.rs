//! Strategy for requests naming a responsible user per item.

use super::{
    BatchOutcome, BatchStrategy, DescriptionTemplate, ExecutionJournal, ItemFailure,
    StrategyError, TaskDraft, TaskItemPipeline, TaskWindow,
};
use crate::batch::domain::{BatchItem, BatchRequest, TaskSource};
use crate::config::{BatchConfig, ConfigError};
use crate::remote::domain::ExternalId;
use async_trait::async_trait;
use chrono::FixedOffset;
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

const DESCRIPTION: &str = "Automatic task: request via Onerequest for case {{ case_identifier }}";

/// Creates one task per item for the item's own responsible user, due at the
/// end of the next business day on the office calendar.
///
/// Items may replace the configured subtype; the task type then follows the
/// subtype's parent.
pub struct OnerequestStrategy<C>
where
    C: Clock + Send + Sync,
{
    pipeline: TaskItemPipeline,
    settings: BatchConfig,
    offset: FixedOffset,
    template: DescriptionTemplate,
    clock: Arc<C>,
}

impl<C> OnerequestStrategy<C>
where
    C: Clock + Send + Sync,
{
    /// Creates the strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the configured office offset is
    /// out of range.
    pub fn new(
        pipeline: TaskItemPipeline,
        settings: BatchConfig,
        clock: Arc<C>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            pipeline,
            offset: settings.local_offset()?,
            settings,
            template: DescriptionTemplate::new(DESCRIPTION),
            clock,
        })
    }

    fn draft(&self, item: &BatchItem, window: TaskWindow) -> Result<TaskDraft, ItemFailure> {
        let responsible_user_id = item.responsible_user_id.ok_or_else(|| {
            ItemFailure::Validation("item names no responsible user".to_owned())
        })?;
        let (type_id, subtype_id) = match item.subtype_id {
            Some(subtype_id) => (None, subtype_id),
            None => (
                Some(ExternalId::new(self.settings.task_type_id)),
                ExternalId::new(self.settings.task_subtype_id),
            ),
        };
        Ok(TaskDraft {
            responsible_user_id,
            type_id,
            subtype_id,
            status_id: self.settings.task_status_id,
            description: self.template.render(
                item,
                TaskSource::Onerequest,
                window.deadline.with_timezone(&self.offset).date_naive(),
            )?,
            notes: item.notes.clone(),
            window,
        })
    }
}

#[async_trait]
impl<C> BatchStrategy for OnerequestStrategy<C>
where
    C: Clock + Send + Sync,
{
    fn source(&self) -> TaskSource {
        TaskSource::Onerequest
    }

    async fn process_batch(
        &self,
        request: &BatchRequest,
        journal: &mut ExecutionJournal<'_>,
    ) -> Result<BatchOutcome, StrategyError> {
        info!(items = request.items.len(), "processing Onerequest batch");
        journal.plan(&request.items).await?;

        let window = TaskWindow::end_of_next_business_day(self.clock.utc(), self.offset);
        self.pipeline
            .process(journal, |item| self.draft(item, window))
            .await
    }
}
