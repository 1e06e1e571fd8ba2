//! Per-item control flow shared by every strategy.

use super::{
    BatchOutcome, ExecutionJournal, FixedIntervalThrottle, ItemFailure, StrategyError, TaskWindow,
    format_remote_instant,
};
use crate::batch::domain::{BatchItem, ExecutionItem};
use crate::catalog::domain::CatalogKind;
use crate::catalog::ports::CatalogLookup;
use crate::remote::domain::{ExternalId, StatusRef, TaskLink, TaskParticipant, TaskPayload};
use crate::remote::ports::RemoteSystem;
use std::sync::Arc;
use tracing::{error, info, warn};

const DEFAULT_PRIORITY: &str = "Normal";

/// Task attributes a strategy derives from one item before the case is
/// resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// User owning the task.
    pub responsible_user_id: ExternalId,
    /// Expected parent type of the subtype; `None` adopts the subtype's
    /// parent.
    pub type_id: Option<ExternalId>,
    /// Task subtype.
    pub subtype_id: ExternalId,
    /// Initial task status.
    pub status_id: i64,
    /// Rendered description.
    pub description: String,
    /// Notes copied onto the task.
    pub notes: Option<String>,
    /// Start instant and deadline.
    pub window: TaskWindow,
}

impl TaskDraft {
    fn into_payload(self, type_id: ExternalId, office_id: ExternalId) -> TaskPayload {
        TaskPayload {
            description: self.description,
            priority: DEFAULT_PRIORITY.to_owned(),
            start_date_time: format_remote_instant(self.window.start),
            end_date_time: format_remote_instant(self.window.deadline),
            status: StatusRef { id: self.status_id },
            type_id,
            sub_type_id: self.subtype_id,
            responsible_office_id: office_id,
            origin_office_id: office_id,
            participants: vec![TaskParticipant::owner(self.responsible_user_id)],
            notes: self.notes,
        }
    }
}

/// Turns planned items into remote tasks, one at a time.
///
/// Each item is validated, resolved against the remote case and the task
/// catalog, created, linked to its case, and recorded in the journal. A
/// failure affects only its own item.
#[derive(Clone)]
pub struct TaskItemPipeline {
    remote: Arc<dyn RemoteSystem>,
    catalog: Arc<dyn CatalogLookup>,
    throttle: Arc<FixedIntervalThrottle>,
}

impl TaskItemPipeline {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(
        remote: Arc<dyn RemoteSystem>,
        catalog: Arc<dyn CatalogLookup>,
        throttle: Arc<FixedIntervalThrottle>,
    ) -> Self {
        Self {
            remote,
            catalog,
            throttle,
        }
    }

    /// Processes the journal's planned items in order.
    ///
    /// `draft` builds the task attributes for an item; returning an error
    /// records the item as a failure.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError::Cancelled`] when cancellation is requested
    /// between items, [`StrategyError::Auth`] when no access token can be
    /// obtained, and [`StrategyError::Journal`] when an outcome cannot be
    /// persisted. Items recorded before the error stay recorded; the item
    /// that hit the token failure is left for the caller to record.
    pub async fn process<F>(
        &self,
        journal: &mut ExecutionJournal<'_>,
        draft: F,
    ) -> Result<BatchOutcome, StrategyError>
    where
        F: Fn(&BatchItem) -> Result<TaskDraft, ItemFailure> + Send + Sync,
    {
        let items = journal.planned().to_vec();
        let mut outcome = BatchOutcome::default();
        for (position, item) in items.iter().enumerate() {
            if journal.is_cancelled() {
                warn!(
                    completed = position,
                    planned = items.len(),
                    "batch cancelled between items"
                );
                return Err(StrategyError::Cancelled {
                    completed: position,
                });
            }
            self.throttle.acquire().await;

            let business_key = item.business_key(position);
            let entry = match self.process_item(item, &draft).await {
                Ok(task_id) => {
                    info!(business_key = %business_key, %task_id, "task created");
                    outcome.record_success();
                    ExecutionItem::succeeded(business_key, item.clone(), task_id)
                }
                Err(failure) => {
                    if let Some(auth) = failure.auth_error() {
                        error!(
                            business_key = %business_key,
                            error = %auth,
                            "no access token; stopping the batch"
                        );
                        return Err(StrategyError::Auth(auth.clone()));
                    }
                    let reason = failure.to_string();
                    error!(business_key = %business_key, error = %reason, "item failed");
                    outcome.record_failure(business_key.clone(), reason.clone());
                    ExecutionItem::failed(business_key, item.clone(), reason)
                }
            };
            journal.record(entry).await?;
        }
        Ok(outcome)
    }

    async fn process_item<F>(&self, item: &BatchItem, draft: &F) -> Result<ExternalId, ItemFailure>
    where
        F: Fn(&BatchItem) -> Result<TaskDraft, ItemFailure> + Send + Sync,
    {
        let identifier = item.case_identifier.trim();
        if identifier.is_empty() {
            return Err(ItemFailure::Validation("case identifier is missing".to_owned()));
        }
        let task = draft(item)?;

        let lawsuit = self
            .remote
            .search_case(identifier)
            .await?
            .ok_or_else(|| ItemFailure::NotFound(identifier.to_owned()))?;
        let office_id = lawsuit.responsible_office_id.ok_or_else(|| {
            ItemFailure::Validation(format!("case {identifier} has no responsible office"))
        })?;
        let type_id = self.resolve_type(&task).await?;

        let created = self
            .remote
            .create_task(&task.into_payload(type_id, office_id))
            .await?;
        if !self
            .remote
            .link_task(created.id, &TaskLink::litigation(lawsuit.id))
            .await
        {
            warn!(
                task_id = %created.id,
                lawsuit_id = %lawsuit.id,
                "task created but not linked to its case"
            );
        }
        Ok(created.id)
    }

    async fn resolve_type(&self, task: &TaskDraft) -> Result<ExternalId, ItemFailure> {
        let subtype = self
            .catalog
            .find_active(CatalogKind::TaskType, task.subtype_id)
            .await?
            .ok_or_else(|| {
                ItemFailure::Validation(format!(
                    "task subtype {} is not an active catalog entry",
                    task.subtype_id
                ))
            })?;
        let parent = subtype.parent_external_id.ok_or_else(|| {
            ItemFailure::Validation(format!("catalog entry {} is not a task subtype", task.subtype_id))
        })?;
        match task.type_id {
            Some(expected) if expected != parent => Err(ItemFailure::Validation(format!(
                "task subtype {} belongs to type {parent}, not {expected}",
                task.subtype_id
            ))),
            _ => Ok(parent),
        }
    }
}
