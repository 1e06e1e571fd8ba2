//! Catalog records listed by the remote system.

use super::ExternalId;
use serde::{Deserialize, Serialize};

/// Office (area) record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOffice {
    /// Remote office identifier.
    pub id: ExternalId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Hierarchical path of the office.
    #[serde(default)]
    pub path: Option<String>,
    /// Whether tasks may be allocated to the office.
    #[serde(default)]
    pub allocate_data: bool,
}

/// User record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    /// Remote user identifier.
    pub id: ExternalId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// E-mail address.
    #[serde(default)]
    pub email: Option<String>,
    /// Whether the user account is active.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

/// Task type record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTaskType {
    /// Remote task type identifier.
    pub id: ExternalId,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Task subtype record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTaskSubtype {
    /// Remote task subtype identifier.
    pub id: ExternalId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Parent task type.
    #[serde(default)]
    pub parent_type_id: Option<ExternalId>,
}

/// Task types together with their subtypes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskTypeCatalog {
    /// Top-level task types.
    pub types: Vec<RemoteTaskType>,
    /// Subtypes referencing a task type.
    pub subtypes: Vec<RemoteTaskSubtype>,
}

impl TaskTypeCatalog {
    /// Returns the subtypes whose parent is the given type.
    pub fn subtypes_of(&self, type_id: ExternalId) -> impl Iterator<Item = &RemoteTaskSubtype> {
        self.subtypes
            .iter()
            .filter(move |subtype| subtype.parent_type_id == Some(type_id))
    }
}
