//! In-memory remote system for tests and dry runs.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::remote::{
    domain::{
        ExternalId, RemoteError, RemoteLawsuit, RemoteOffice, RemoteResult, RemoteTask,
        RemoteUser, TaskLink, TaskPayload, TaskTypeCatalog,
    },
    ports::RemoteSystem,
};

/// Scriptable, thread-safe stand-in for the remote system.
///
/// Created tasks receive sequential identifiers starting at `1`. Every call
/// is recorded so tests can assert on what was sent.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRemoteSystem {
    state: Arc<RwLock<InMemoryRemoteState>>,
}

#[derive(Debug, Default)]
struct InMemoryRemoteState {
    lawsuits: HashMap<String, RemoteLawsuit>,
    failing_searches: HashMap<String, RemoteError>,
    rejected_descriptions: HashSet<String>,
    link_failures: bool,
    created: Vec<(ExternalId, TaskPayload)>,
    links: Vec<(ExternalId, TaskLink)>,
    searches: Vec<String>,
    offices: Vec<RemoteOffice>,
    users: Vec<RemoteUser>,
    task_types: TaskTypeCatalog,
    last_task_id: i64,
}

impl InMemoryRemoteSystem {
    /// Creates an empty remote system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, InMemoryRemoteState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryRemoteState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a lawsuit reachable through its case identifier.
    pub fn add_lawsuit(&self, identifier: &str, lawsuit_id: i64, office_id: Option<i64>) {
        self.write().lawsuits.insert(
            identifier.to_owned(),
            RemoteLawsuit {
                id: ExternalId::new(lawsuit_id),
                identifier_number: Some(identifier.to_owned()),
                responsible_office_id: office_id.map(ExternalId::new),
            },
        );
    }

    /// Makes searches for `identifier` fail with `error`.
    pub fn fail_search(&self, identifier: &str, error: RemoteError) {
        self.write()
            .failing_searches
            .insert(identifier.to_owned(), error);
    }

    /// Makes task creation fail for payloads whose description contains
    /// `fragment`.
    pub fn reject_tasks_mentioning(&self, fragment: &str) {
        self.write().rejected_descriptions.insert(fragment.to_owned());
    }

    /// Makes every task link attempt fail.
    pub fn fail_links(&self) {
        self.write().link_failures = true;
    }

    /// Replaces the office catalog.
    pub fn set_offices(&self, offices: Vec<RemoteOffice>) {
        self.write().offices = offices;
    }

    /// Replaces the user catalog.
    pub fn set_users(&self, users: Vec<RemoteUser>) {
        self.write().users = users;
    }

    /// Replaces the task type catalog.
    pub fn set_task_types(&self, catalog: TaskTypeCatalog) {
        self.write().task_types = catalog;
    }

    /// Returns created tasks with their assigned identifiers, in creation order.
    #[must_use]
    pub fn created_tasks(&self) -> Vec<(ExternalId, TaskPayload)> {
        self.read().created.clone()
    }

    /// Returns successful link requests, in order.
    #[must_use]
    pub fn links(&self) -> Vec<(ExternalId, TaskLink)> {
        self.read().links.clone()
    }

    /// Returns every searched case identifier, in order.
    #[must_use]
    pub fn searches(&self) -> Vec<String> {
        self.read().searches.clone()
    }
}

#[async_trait]
impl RemoteSystem for InMemoryRemoteSystem {
    async fn search_case(&self, identifier: &str) -> RemoteResult<Option<RemoteLawsuit>> {
        let mut state = self.write();
        state.searches.push(identifier.to_owned());
        if let Some(error) = state.failing_searches.get(identifier) {
            return Err(error.clone());
        }
        Ok(state.lawsuits.get(identifier).cloned())
    }

    async fn create_task(&self, payload: &TaskPayload) -> RemoteResult<RemoteTask> {
        let mut state = self.write();
        if state
            .rejected_descriptions
            .iter()
            .any(|fragment| payload.description.contains(fragment.as_str()))
        {
            return Err(RemoteError::Permanent {
                status: 400,
                body: "task rejected".to_owned(),
            });
        }
        state.last_task_id += 1;
        let id = ExternalId::new(state.last_task_id);
        state.created.push((id, payload.clone()));
        Ok(RemoteTask { id })
    }

    async fn link_task(&self, task_id: ExternalId, link: &TaskLink) -> bool {
        let mut state = self.write();
        if state.link_failures {
            return false;
        }
        state.links.push((task_id, link.clone()));
        true
    }

    async fn list_offices(&self) -> RemoteResult<Vec<RemoteOffice>> {
        Ok(self
            .read()
            .offices
            .iter()
            .filter(|office| office.allocate_data)
            .cloned()
            .collect())
    }

    async fn list_users(&self) -> RemoteResult<Vec<RemoteUser>> {
        Ok(self.read().users.clone())
    }

    async fn list_task_types(&self) -> RemoteResult<TaskTypeCatalog> {
        Ok(self.read().task_types.clone())
    }
}
