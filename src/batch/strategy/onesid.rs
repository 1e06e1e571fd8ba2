//! Strategy for case lists answered through the Onesid portal.

use super::{
    BatchOutcome, BatchStrategy, DescriptionTemplate, ExecutionJournal, ItemFailure,
    StrategyError, TaskDraft, TaskItemPipeline, TaskWindow,
};
use crate::batch::domain::{BatchItem, BatchRequest, TaskSource};
use crate::config::BatchConfig;
use crate::remote::domain::ExternalId;
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

const DESCRIPTION: &str =
    "Automatic task: subsidy fulfilled via Onesid for case {{ case_identifier }}";

/// Creates one task per listed case, all owned by the request's responsible
/// user, due at midnight UTC opening the next business day.
pub struct OnesidStrategy<C>
where
    C: Clock + Send + Sync,
{
    pipeline: TaskItemPipeline,
    settings: BatchConfig,
    template: DescriptionTemplate,
    clock: Arc<C>,
}

impl<C> OnesidStrategy<C>
where
    C: Clock + Send + Sync,
{
    /// Creates the strategy with the configured task type, subtype, and
    /// status.
    #[must_use]
    pub fn new(pipeline: TaskItemPipeline, settings: BatchConfig, clock: Arc<C>) -> Self {
        Self {
            pipeline,
            settings,
            template: DescriptionTemplate::new(DESCRIPTION),
            clock,
        }
    }

    fn draft(&self, item: &BatchItem, window: TaskWindow) -> Result<TaskDraft, ItemFailure> {
        let responsible_user_id = item.responsible_user_id.ok_or_else(|| {
            ItemFailure::Validation("responsible user is missing".to_owned())
        })?;
        Ok(TaskDraft {
            responsible_user_id,
            type_id: Some(ExternalId::new(self.settings.task_type_id)),
            subtype_id: ExternalId::new(self.settings.task_subtype_id),
            status_id: self.settings.task_status_id,
            description: self.template.render(
                item,
                TaskSource::Onesid,
                window.deadline.date_naive(),
            )?,
            notes: item.notes.clone(),
            window,
        })
    }
}

#[async_trait]
impl<C> BatchStrategy for OnesidStrategy<C>
where
    C: Clock + Send + Sync,
{
    fn source(&self) -> TaskSource {
        TaskSource::Onesid
    }

    async fn process_batch(
        &self,
        request: &BatchRequest,
        journal: &mut ExecutionJournal<'_>,
    ) -> Result<BatchOutcome, StrategyError> {
        let items: Vec<BatchItem> = request
            .items
            .iter()
            .map(|item| {
                let mut owned = item.clone();
                owned.responsible_user_id = owned.responsible_user_id.or(request.responsible_user_id);
                owned
            })
            .collect();
        info!(items = items.len(), "processing Onesid batch");
        journal.plan(&items).await?;

        let window = TaskWindow::start_of_next_business_day(self.clock.utc());
        self.pipeline
            .process(journal, |item| self.draft(item, window))
            .await
    }
}
