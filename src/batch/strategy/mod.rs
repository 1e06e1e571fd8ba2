//! Source-specific batch processing.
//!
//! Each intake source has a [`BatchStrategy`] that turns a [`BatchRequest`]
//! into remote tasks. The variants share [`TaskItemPipeline`] for the
//! per-item control flow and differ in how they read items, which task
//! attributes they assign, and when the tasks fall due:
//!
//! - [`OnesidStrategy`] for case lists sharing one responsible user
//! - [`OnerequestStrategy`] for requests naming a user per item
//! - [`SpreadsheetStrategy`] for uploaded tables

mod cancellation;
mod journal;
mod onerequest;
mod onesid;
mod pipeline;
mod registry;
mod schedule;
mod spreadsheet;
mod template;
mod throttle;

pub use cancellation::CancellationFlag;
pub use journal::ExecutionJournal;
pub use onerequest::OnerequestStrategy;
pub use onesid::OnesidStrategy;
pub use pipeline::{TaskDraft, TaskItemPipeline};
pub use registry::StrategyRegistry;
pub use schedule::{TaskWindow, format_remote_instant, next_business_day};
pub use spreadsheet::{SPREADSHEET_HEADER, SpreadsheetStrategy};
pub use template::DescriptionTemplate;
pub use throttle::FixedIntervalThrottle;

use crate::batch::domain::{BatchRequest, TaskSource};
use crate::batch::ports::ExecutionRepositoryError;
use crate::catalog::ports::CatalogError;
use crate::remote::domain::{AuthError, RemoteError};
use async_trait::async_trait;
use thiserror::Error;

/// Processing strategy for one intake source.
#[async_trait]
pub trait BatchStrategy: Send + Sync {
    /// Returns the source this strategy handles.
    fn source(&self) -> TaskSource;

    /// Processes a batch, recording every item outcome in `journal`.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError`] when the batch as a whole cannot proceed.
    /// Item-level failures are recorded, never returned.
    async fn process_batch(
        &self,
        request: &BatchRequest,
        journal: &mut ExecutionJournal<'_>,
    ) -> Result<BatchOutcome, StrategyError>;
}

/// Failed item with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDetail {
    /// Business key of the failed item.
    pub business_key: String,
    /// Failure reason.
    pub reason: String,
}

/// Counts reported by a strategy after processing a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Items that produced a remote task.
    pub success_count: usize,
    /// Items that failed.
    pub failure_count: usize,
    /// Failed items in processing order.
    pub failures: Vec<FailureDetail>,
}

impl BatchOutcome {
    const fn record_success(&mut self) {
        self.success_count += 1;
    }

    fn record_failure(&mut self, business_key: String, reason: String) {
        self.failure_count += 1;
        self.failures.push(FailureDetail {
            business_key,
            reason,
        });
    }
}

/// Reason a single item could not be turned into a remote task.
#[derive(Debug, Error)]
pub enum ItemFailure {
    /// The item or its resolved data is incomplete or inconsistent.
    #[error("{0}")]
    Validation(String),

    /// No remote case matches the identifier.
    #[error("case {0} not found in the remote system")]
    NotFound(String),

    /// The task catalog could not be consulted.
    #[error("catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),

    /// A remote call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl ItemFailure {
    /// Returns the token exchange failure behind this item, if any.
    #[must_use]
    pub const fn auth_error(&self) -> Option<&AuthError> {
        match self {
            Self::Remote(RemoteError::Auth(err))
            | Self::Catalog(CatalogError::Remote(RemoteError::Auth(err))) => Some(err),
            _ => None,
        }
    }
}

/// Errors that stop a whole batch.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The request cannot be processed by this strategy.
    #[error("invalid batch payload: {0}")]
    InvalidPayload(String),

    /// Cancellation was requested between items.
    #[error("batch cancelled after {completed} items")]
    Cancelled {
        /// Items processed before cancellation.
        completed: usize,
    },

    /// No access token could be obtained; later items would fail the same
    /// way.
    #[error("remote authorization failed: {0}")]
    Auth(AuthError),

    /// An item outcome could not be persisted.
    #[error("execution journal write failed: {0}")]
    Journal(#[from] ExecutionRepositoryError),
}
