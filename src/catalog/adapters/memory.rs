//! In-memory catalog mirror.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::catalog::{
    domain::{CatalogKind, MirrorEntry},
    ports::{
        CatalogLookup, CatalogMirror, CatalogMirrorError, CatalogMirrorResult, CatalogResult,
    },
};
use crate::remote::domain::ExternalId;

type EntryKey = (CatalogKind, ExternalId);

/// Thread-safe in-memory catalog mirror.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogMirror {
    state: Arc<RwLock<BTreeMap<EntryKey, MirrorEntry>>>,
}

impl InMemoryCatalogMirror {
    /// Creates an empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mirror pre-populated with `entries`.
    #[must_use]
    pub fn with_entries(entries: impl IntoIterator<Item = MirrorEntry>) -> Self {
        let map = entries
            .into_iter()
            .map(|entry| ((entry.kind, entry.external_id), entry))
            .collect();
        Self {
            state: Arc::new(RwLock::new(map)),
        }
    }
}

fn lock_error(err: impl std::fmt::Display) -> CatalogMirrorError {
    CatalogMirrorError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl CatalogMirror for InMemoryCatalogMirror {
    async fn find_by_external_id(
        &self,
        kind: CatalogKind,
        external_id: ExternalId,
    ) -> CatalogMirrorResult<Option<MirrorEntry>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.get(&(kind, external_id)).cloned())
    }

    async fn insert(&self, entry: &MirrorEntry) -> CatalogMirrorResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let key = (entry.kind, entry.external_id);
        if state.contains_key(&key) {
            return Err(CatalogMirrorError::Duplicate {
                kind: entry.kind,
                external_id: entry.external_id,
            });
        }
        state.insert(key, entry.clone());
        Ok(())
    }

    async fn update(&self, entry: &MirrorEntry) -> CatalogMirrorResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let Some(stored) = state.get_mut(&(entry.kind, entry.external_id)) else {
            return Err(CatalogMirrorError::NotFound {
                kind: entry.kind,
                external_id: entry.external_id,
            });
        };
        *stored = entry.clone();
        Ok(())
    }

    async fn mark_inactive_if_absent(
        &self,
        kind: CatalogKind,
        present: &HashSet<ExternalId>,
    ) -> CatalogMirrorResult<usize> {
        let mut state = self.state.write().map_err(lock_error)?;
        let mut changed = 0;
        for entry in state.values_mut() {
            if entry.kind == kind && entry.is_active && !present.contains(&entry.external_id) {
                entry.is_active = false;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn list(&self, kind: CatalogKind) -> CatalogMirrorResult<Vec<MirrorEntry>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .values()
            .filter(|entry| entry.kind == kind)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CatalogLookup for InMemoryCatalogMirror {
    async fn find_active(
        &self,
        kind: CatalogKind,
        external_id: ExternalId,
    ) -> CatalogResult<Option<MirrorEntry>> {
        let entry = self.find_by_external_id(kind, external_id).await?;
        Ok(entry.filter(|found| found.is_active))
    }
}
