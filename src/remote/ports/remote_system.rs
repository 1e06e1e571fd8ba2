//! Operations offered by the remote case-management system.

use crate::remote::domain::{
    ExternalId, RemoteLawsuit, RemoteOffice, RemoteResult, RemoteTask, RemoteUser, TaskLink,
    TaskPayload, TaskTypeCatalog,
};
use async_trait::async_trait;

/// Remote case-management contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteSystem: Send + Sync {
    /// Looks up a lawsuit by its case identifier.
    ///
    /// Returns `None` when no lawsuit carries the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::domain::RemoteError`] when the lookup request
    /// fails after retries.
    async fn search_case(&self, identifier: &str) -> RemoteResult<Option<RemoteLawsuit>>;

    /// Creates a task and returns its remote identifier.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::domain::RemoteError::TaskCreation`] when the
    /// response carries no task identifier, or another remote error when the
    /// request fails.
    async fn create_task(&self, payload: &TaskPayload) -> RemoteResult<RemoteTask>;

    /// Links a task to another remote entity.
    ///
    /// Linking is best effort: failures are logged and reported as `false`.
    async fn link_task(&self, task_id: ExternalId, link: &TaskLink) -> bool;

    /// Lists offices that accept task allocation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::domain::RemoteError`] when the listing cannot
    /// be produced at all.
    async fn list_offices(&self) -> RemoteResult<Vec<RemoteOffice>>;

    /// Lists users.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::domain::RemoteError`] when the listing cannot
    /// be produced at all.
    async fn list_users(&self) -> RemoteResult<Vec<RemoteUser>>;

    /// Lists task types and their subtypes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::remote::domain::RemoteError`] when the listing cannot
    /// be produced at all.
    async fn list_task_types(&self) -> RemoteResult<TaskTypeCatalog>;
}
