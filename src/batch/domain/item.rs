//! Batch items and their recorded outcomes.

use crate::remote::domain::ExternalId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Processing status of one batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    /// The item has not been processed.
    Pending,
    /// A remote task was created for the item.
    Success,
    /// The item could not be turned into a remote task.
    Failure,
}

impl ItemStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }

    /// Returns `true` for statuses that count towards the record totals.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown item status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown item status: {0}")]
pub struct ParseItemStatusError(pub String);

impl TryFrom<&str> for ItemStatus {
    type Error = ParseItemStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "SUCCESS" => Ok(Self::Success),
            "FAILURE" => Ok(Self::Failure),
            _ => Err(ParseItemStatusError(value.to_owned())),
        }
    }
}

/// One unit of work in a batch request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    /// Case identifier (CNJ number) the task is created for.
    pub case_identifier: String,
    /// User responsible for the task; falls back to the request default.
    pub responsible_user_id: Option<ExternalId>,
    /// Free-text notes copied onto the task.
    pub notes: Option<String>,
    /// Task subtype replacing the strategy default.
    pub subtype_id: Option<ExternalId>,
}

impl BatchItem {
    /// Creates an item for a case identifier.
    #[must_use]
    pub fn new(case_identifier: impl Into<String>) -> Self {
        Self {
            case_identifier: case_identifier.into(),
            ..Self::default()
        }
    }

    /// Sets the responsible user.
    #[must_use]
    pub const fn with_responsible_user(mut self, user_id: ExternalId) -> Self {
        self.responsible_user_id = Some(user_id);
        self
    }

    /// Sets the notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets the task subtype override.
    #[must_use]
    pub const fn with_subtype(mut self, subtype_id: ExternalId) -> Self {
        self.subtype_id = Some(subtype_id);
        self
    }

    /// Returns the key identifying the item in execution logs: the trimmed
    /// case identifier, or its one-based position when the identifier is blank.
    #[must_use]
    pub fn business_key(&self, position: usize) -> String {
        let trimmed = self.case_identifier.trim();
        if trimmed.is_empty() {
            format!("item {}", position + 1)
        } else {
            trimmed.to_owned()
        }
    }
}

/// Recorded outcome of one batch item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionItem {
    business_key: String,
    status: ItemStatus,
    remote_task_id: Option<ExternalId>,
    error_message: Option<String>,
    payload: BatchItem,
}

impl ExecutionItem {
    /// Records a created task.
    #[must_use]
    pub fn succeeded(
        business_key: impl Into<String>,
        payload: BatchItem,
        task_id: ExternalId,
    ) -> Self {
        Self {
            business_key: business_key.into(),
            status: ItemStatus::Success,
            remote_task_id: Some(task_id),
            error_message: None,
            payload,
        }
    }

    /// Records a failed item with its reason.
    #[must_use]
    pub fn failed(
        business_key: impl Into<String>,
        payload: BatchItem,
        message: impl Into<String>,
    ) -> Self {
        Self {
            business_key: business_key.into(),
            status: ItemStatus::Failure,
            remote_task_id: None,
            error_message: Some(message.into()),
            payload,
        }
    }

    /// Records an item that has not been processed yet.
    #[must_use]
    pub fn pending(business_key: impl Into<String>, payload: BatchItem) -> Self {
        Self {
            business_key: business_key.into(),
            status: ItemStatus::Pending,
            remote_task_id: None,
            error_message: None,
            payload,
        }
    }

    /// Returns the business key (usually the case identifier).
    #[must_use]
    pub fn business_key(&self) -> &str {
        &self.business_key
    }

    /// Returns the item status.
    #[must_use]
    pub const fn status(&self) -> ItemStatus {
        self.status
    }

    /// Returns the created remote task, if any.
    #[must_use]
    pub const fn remote_task_id(&self) -> Option<ExternalId> {
        self.remote_task_id
    }

    /// Returns the failure reason, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns the item as it was submitted, used to retry failures.
    #[must_use]
    pub const fn payload(&self) -> &BatchItem {
        &self.payload
    }
}
