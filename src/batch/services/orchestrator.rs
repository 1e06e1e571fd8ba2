//! Batch submission, retry, and lookup.

use crate::batch::domain::{BatchItem, BatchRequest, ExecutionId, ExecutionRecord};
use crate::batch::ports::{ExecutionRepository, ExecutionRepositoryError};
use crate::batch::strategy::{CancellationFlag, ExecutionJournal, StrategyRegistry};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Result type for orchestrator operations.
pub type BatchOrchestratorResult<T> = Result<T, BatchOrchestratorError>;

/// Errors returned by [`BatchOrchestrator`].
#[derive(Debug, Error)]
pub enum BatchOrchestratorError {
    /// The request cannot be accepted; nothing was persisted.
    #[error("invalid batch request: {0}")]
    InvalidRequest(String),

    /// No strategy handles the source; the execution was recorded with every
    /// planned item failed.
    #[error("no strategy registered for source '{source_name}' (execution {execution_id})")]
    UnknownSource {
        /// Source name as submitted.
        source_name: String,
        /// Execution recording the rejected batch.
        execution_id: ExecutionId,
    },

    /// The execution does not exist.
    #[error("execution not found: {0}")]
    NotFound(ExecutionId),

    /// The execution has no failed items.
    #[error("execution {0} has no failed items to retry")]
    NothingToRetry(ExecutionId),

    /// The execution repository failed.
    #[error(transparent)]
    Repository(#[from] ExecutionRepositoryError),
}

/// Routes batches to their source's strategy and keeps the execution log.
///
/// Every accepted batch leaves a finished record whose counters add up to its
/// total, whatever the strategy does.
pub struct BatchOrchestrator<R, C>
where
    R: ExecutionRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    registry: StrategyRegistry,
    clock: Arc<C>,
}

impl<R, C> BatchOrchestrator<R, C>
where
    R: ExecutionRepository,
    C: Clock + Send + Sync,
{
    /// Creates an orchestrator.
    #[must_use]
    pub const fn new(repository: Arc<R>, registry: StrategyRegistry, clock: Arc<C>) -> Self {
        Self {
            repository,
            registry,
            clock,
        }
    }

    /// Processes a batch to completion.
    ///
    /// # Errors
    ///
    /// See [`submit_with_cancellation`](Self::submit_with_cancellation).
    pub async fn submit(
        &self,
        source_name: &str,
        request: &BatchRequest,
    ) -> BatchOrchestratorResult<ExecutionRecord> {
        self.submit_with_cancellation(source_name, request, CancellationFlag::new())
            .await
    }

    /// Processes a batch, stopping before the next item once `cancellation`
    /// is raised.
    ///
    /// Items left unprocessed by a cancelled or failed strategy are recorded
    /// as failures carrying the error message, and the record is finished.
    ///
    /// # Errors
    ///
    /// Returns [`BatchOrchestratorError::InvalidRequest`] for a blank source
    /// name, [`BatchOrchestratorError::UnknownSource`] when no strategy
    /// handles the source, and [`BatchOrchestratorError::Repository`] when
    /// the record cannot be stored or its summary persisted.
    pub async fn submit_with_cancellation(
        &self,
        source_name: &str,
        request: &BatchRequest,
        cancellation: CancellationFlag,
    ) -> BatchOrchestratorResult<ExecutionRecord> {
        let trimmed = source_name.trim();
        if trimmed.is_empty() {
            return Err(BatchOrchestratorError::InvalidRequest(
                "source name is empty".to_owned(),
            ));
        }

        let mut record =
            ExecutionRecord::start(trimmed, request.provisional_total(), &*self.clock);
        self.repository.store(&record).await?;
        let execution_id = record.id();
        info!(%execution_id, source = trimmed, planned = record.total_items(), "batch started");

        let strategy = self.registry.resolve(trimmed);
        let unknown_source = strategy.is_none();
        {
            let mut journal = ExecutionJournal::new(
                &mut record,
                &*self.repository,
                request.items.clone(),
                cancellation,
            );
            match strategy {
                Some(strategy) => match strategy.process_batch(request, &mut journal).await {
                    Ok(outcome) => info!(
                        %execution_id,
                        success = outcome.success_count,
                        failure = outcome.failure_count,
                        "strategy completed"
                    ),
                    Err(err) => {
                        error!(%execution_id, error = %err, "strategy aborted the batch");
                        fail_remaining(&mut journal, &err.to_string()).await;
                    }
                },
                None => {
                    let message = format!("no strategy registered for source '{trimmed}'");
                    error!(%execution_id, "{message}");
                    fail_remaining(&mut journal, &message).await;
                }
            }
        }

        record.finish(&*self.clock);
        self.repository.update_summary(&record).await?;
        info!(
            %execution_id,
            total = record.total_items(),
            success = record.success_count(),
            failure = record.failure_count(),
            "batch finished"
        );

        if unknown_source {
            return Err(BatchOrchestratorError::UnknownSource {
                source_name: trimmed.to_owned(),
                execution_id,
            });
        }
        Ok(record)
    }

    /// Resubmits the failed items of an execution under the same source.
    ///
    /// The retry runs as a new execution.
    ///
    /// # Errors
    ///
    /// Returns [`BatchOrchestratorError::NotFound`] for an unknown
    /// execution, [`BatchOrchestratorError::NothingToRetry`] when it has no
    /// failures, and any error of [`submit`](Self::submit).
    pub async fn retry_failed(
        &self,
        execution_id: ExecutionId,
    ) -> BatchOrchestratorResult<ExecutionRecord> {
        let previous = self.find(execution_id).await?;
        let items: Vec<BatchItem> = previous
            .failed_items()
            .map(|item| item.payload().clone())
            .collect();
        if items.is_empty() {
            return Err(BatchOrchestratorError::NothingToRetry(execution_id));
        }
        info!(%execution_id, items = items.len(), "retrying failed items");
        self.submit(previous.source(), &BatchRequest::from_items(items))
            .await
    }

    /// Loads an execution with its items.
    ///
    /// # Errors
    ///
    /// Returns [`BatchOrchestratorError::NotFound`] for an unknown execution
    /// and [`BatchOrchestratorError::Repository`] when the lookup fails.
    pub async fn find(&self, execution_id: ExecutionId) -> BatchOrchestratorResult<ExecutionRecord> {
        self.repository
            .find_by_id(execution_id)
            .await?
            .ok_or(BatchOrchestratorError::NotFound(execution_id))
    }
}

async fn fail_remaining(journal: &mut ExecutionJournal<'_>, message: &str) {
    match journal.fail_remaining(message).await {
        Ok(0) => {}
        Ok(count) => warn!(count, "unprocessed items recorded as failures"),
        Err(err) => error!(error = %err, "could not persist every unprocessed item"),
    }
}
