//! Mirrored catalog entries and synchronization reports.

use crate::remote::domain::{
    ExternalId, RemoteOffice, RemoteTaskSubtype, RemoteTaskType, RemoteUser,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

/// Catalog a mirror entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    /// Offices that accept task allocation.
    Office,
    /// Remote users.
    User,
    /// Task types and their subtypes.
    TaskType,
}

impl CatalogKind {
    /// Returns the canonical catalog name, also used as the cache slot name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Office => "offices",
            Self::User => "users",
            Self::TaskType => "task_types",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local copy of one remote catalog record.
///
/// Task types and subtypes share the [`CatalogKind::TaskType`] catalog;
/// subtypes carry their parent's identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorEntry {
    /// Catalog the entry belongs to.
    pub kind: CatalogKind,
    /// Identifier assigned by the remote system.
    pub external_id: ExternalId,
    /// Display name.
    pub name: String,
    /// Secondary attribute: office path or user e-mail.
    pub detail: Option<String>,
    /// Parent task type for subtypes.
    pub parent_external_id: Option<ExternalId>,
    /// Whether the record is still offered by the remote system.
    pub is_active: bool,
}

impl MirrorEntry {
    /// Mirrors an office.
    #[must_use]
    pub fn from_office(office: &RemoteOffice) -> Self {
        Self {
            kind: CatalogKind::Office,
            external_id: office.id,
            name: office.name.clone(),
            detail: office.path.clone(),
            parent_external_id: None,
            is_active: true,
        }
    }

    /// Mirrors a user, keeping the remote active flag.
    #[must_use]
    pub fn from_user(user: &RemoteUser) -> Self {
        Self {
            kind: CatalogKind::User,
            external_id: user.id,
            name: user.name.clone(),
            detail: user.email.clone(),
            parent_external_id: None,
            is_active: user.is_active,
        }
    }

    /// Mirrors a top-level task type.
    #[must_use]
    pub fn from_task_type(task_type: &RemoteTaskType) -> Self {
        Self {
            kind: CatalogKind::TaskType,
            external_id: task_type.id,
            name: task_type.name.clone(),
            detail: None,
            parent_external_id: None,
            is_active: true,
        }
    }

    /// Mirrors a task subtype.
    #[must_use]
    pub fn from_task_subtype(subtype: &RemoteTaskSubtype) -> Self {
        Self {
            kind: CatalogKind::TaskType,
            external_id: subtype.id,
            name: subtype.name.clone(),
            detail: None,
            parent_external_id: subtype.parent_type_id,
            is_active: true,
        }
    }
}

/// Counts produced by one synchronization phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Entries created in the mirror.
    pub inserted: usize,
    /// Existing entries whose fields changed, including reactivations.
    pub updated: usize,
    /// Entries marked inactive because the remote system no longer lists them.
    pub deactivated: usize,
}

impl SyncReport {
    /// Returns `true` when the phase changed nothing.
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        self.inserted == 0 && self.updated == 0 && self.deactivated == 0
    }
}

impl AddAssign for SyncReport {
    fn add_assign(&mut self, other: Self) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.deactivated += other.deactivated;
    }
}
