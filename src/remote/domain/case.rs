//! Lawsuit and task records exchanged with the remote system.

use super::ExternalId;
use serde::{Deserialize, Serialize};

/// Lawsuit found by its case identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteLawsuit {
    /// Remote lawsuit identifier.
    pub id: ExternalId,
    /// Case identifier (CNJ number) as stored remotely.
    #[serde(default)]
    pub identifier_number: Option<String>,
    /// Office responsible for the lawsuit.
    #[serde(default)]
    pub responsible_office_id: Option<ExternalId>,
}

/// Task created in the remote system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTask {
    /// Remote task identifier.
    pub id: ExternalId,
}

/// Reference to a task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRef {
    /// Remote status identifier.
    pub id: i64,
}

/// Reference to a contact (user) in the remote system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRef {
    /// Remote contact identifier.
    pub id: ExternalId,
}

/// Task participant with its role flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskParticipant {
    /// Participating contact.
    pub contact: ContactRef,
    /// Participant is responsible for the task.
    pub is_responsible: bool,
    /// Participant executes the task.
    pub is_executer: bool,
    /// Participant requested the task.
    pub is_requester: bool,
}

impl TaskParticipant {
    /// Creates a participant holding every role on the task.
    #[must_use]
    pub const fn owner(user_id: ExternalId) -> Self {
        Self {
            contact: ContactRef { id: user_id },
            is_responsible: true,
            is_executer: true,
            is_requester: true,
        }
    }
}

/// Body posted to the remote task collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    /// Free-text task description.
    pub description: String,
    /// Priority label.
    pub priority: String,
    /// Task start instant, RFC 3339 in UTC.
    pub start_date_time: String,
    /// Task deadline, RFC 3339 in UTC.
    pub end_date_time: String,
    /// Initial task status.
    pub status: StatusRef,
    /// Task type identifier.
    pub type_id: ExternalId,
    /// Task subtype identifier.
    pub sub_type_id: ExternalId,
    /// Office responsible for the task.
    pub responsible_office_id: ExternalId,
    /// Office the task originates from.
    pub origin_office_id: ExternalId,
    /// Task participants.
    pub participants: Vec<TaskParticipant>,
    /// Additional notes attached to the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Relationship between a task and another remote entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLink {
    /// Kind of the linked entity.
    pub link_type: String,
    /// Identifier of the linked entity.
    pub link_id: ExternalId,
}

impl TaskLink {
    /// Link type used for lawsuits.
    pub const LITIGATION: &'static str = "Litigation";

    /// Creates a link to a lawsuit.
    #[must_use]
    pub fn litigation(lawsuit_id: ExternalId) -> Self {
        Self {
            link_type: Self::LITIGATION.to_owned(),
            link_id: lawsuit_id,
        }
    }
}
