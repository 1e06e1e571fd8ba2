//! Catalog synchronization and cached lookup.

use crate::catalog::{
    cache::TtlCache,
    domain::{CatalogKind, MirrorEntry, SyncReport},
    ports::{CatalogLookup, CatalogMirror, CatalogResult},
};
use crate::remote::{domain::ExternalId, ports::RemoteSystem};
use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Reports for each catalog synchronized by [`CatalogService::sync_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogSyncSummary {
    /// Office catalog report.
    pub offices: SyncReport,
    /// Task type catalog report, both phases combined.
    pub task_types: SyncReport,
    /// User catalog report.
    pub users: SyncReport,
}

/// Task type synchronization reports, one per phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskTypeSyncReport {
    /// Top-level task types, committed first.
    pub types: SyncReport,
    /// Subtypes, committed once their parents exist.
    pub subtypes: SyncReport,
}

impl TaskTypeSyncReport {
    /// Returns both phases combined.
    #[must_use]
    pub fn combined(&self) -> SyncReport {
        let mut total = self.types;
        total += self.subtypes;
        total
    }
}

/// Copies remote catalogs into the mirror and serves cached lookups.
pub struct CatalogService<R, M, C>
where
    R: RemoteSystem,
    M: CatalogMirror,
    C: Clock + Send + Sync,
{
    remote: Arc<R>,
    mirror: Arc<M>,
    cache: TtlCache<ExternalId, MirrorEntry, C>,
}

impl<R, M, C> CatalogService<R, M, C>
where
    R: RemoteSystem,
    M: CatalogMirror,
    C: Clock + Send + Sync,
{
    /// Creates a service whose cached catalogs live for `ttl`.
    #[must_use]
    pub fn new(remote: Arc<R>, mirror: Arc<M>, clock: Arc<C>, ttl: TimeDelta) -> Self {
        Self {
            remote,
            mirror,
            cache: TtlCache::new(ttl, clock),
        }
    }

    /// Synchronizes offices that accept task allocation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::catalog::ports::CatalogError`] when the remote listing
    /// or a mirror write fails.
    pub async fn sync_offices(&self) -> CatalogResult<SyncReport> {
        let offices = self.remote.list_offices().await?;
        let entries: Vec<MirrorEntry> = offices.iter().map(MirrorEntry::from_office).collect();
        self.reconcile(CatalogKind::Office, &entries).await
    }

    /// Synchronizes users, keeping each user's remote active flag.
    ///
    /// # Errors
    ///
    /// Returns [`crate::catalog::ports::CatalogError`] when the remote listing
    /// or a mirror write fails.
    pub async fn sync_users(&self) -> CatalogResult<SyncReport> {
        let users = self.remote.list_users().await?;
        let entries: Vec<MirrorEntry> = users.iter().map(MirrorEntry::from_user).collect();
        self.reconcile(CatalogKind::User, &entries).await
    }

    /// Synchronizes task types, then their subtypes.
    ///
    /// Subtypes whose identifier collides with a task type, or whose parent
    /// is not listed, are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::catalog::ports::CatalogError`] when the remote listing
    /// or a mirror write fails. Parent types written before the failure stay
    /// applied.
    pub async fn sync_task_types(&self) -> CatalogResult<TaskTypeSyncReport> {
        let catalog = self.remote.list_task_types().await?;
        if catalog.types.is_empty() {
            warn!("remote listed no task types; mirror left untouched");
            return Ok(TaskTypeSyncReport::default());
        }

        let parents: Vec<MirrorEntry> = catalog
            .types
            .iter()
            .map(MirrorEntry::from_task_type)
            .collect();
        let parent_ids: HashSet<ExternalId> =
            parents.iter().map(|entry| entry.external_id).collect();
        let types = self.upsert_all(&parents).await?;
        info!(
            inserted = types.inserted,
            updated = types.updated,
            "task type parents committed"
        );

        let mut children = Vec::with_capacity(catalog.subtypes.len());
        for subtype in &catalog.subtypes {
            if parent_ids.contains(&subtype.id) {
                warn!(subtype_id = %subtype.id, "subtype id collides with a task type; skipping");
                continue;
            }
            if !subtype
                .parent_type_id
                .is_some_and(|parent| parent_ids.contains(&parent))
            {
                warn!(subtype_id = %subtype.id, "subtype parent is unknown; skipping");
                continue;
            }
            children.push(MirrorEntry::from_task_subtype(subtype));
        }
        let mut subtypes = self.upsert_all(&children).await?;

        let present: HashSet<ExternalId> = parents
            .iter()
            .chain(&children)
            .map(|entry| entry.external_id)
            .collect();
        subtypes.deactivated = self
            .mirror
            .mark_inactive_if_absent(CatalogKind::TaskType, &present)
            .await?;
        self.refresh_cache(CatalogKind::TaskType, parents.into_iter().chain(children));

        let report = TaskTypeSyncReport { types, subtypes };
        info!(
            inserted = report.combined().inserted,
            updated = report.combined().updated,
            deactivated = report.combined().deactivated,
            "task type catalog synchronized"
        );
        Ok(report)
    }

    /// Synchronizes offices, then task types, then users.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing catalog; catalogs synchronized
    /// before it stay applied.
    pub async fn sync_all(&self) -> CatalogResult<CatalogSyncSummary> {
        let offices = self.sync_offices().await.inspect_err(|err| {
            error!(catalog = %CatalogKind::Office, error = %err, "catalog sync failed");
        })?;
        let task_types = self.sync_task_types().await.inspect_err(|err| {
            error!(catalog = %CatalogKind::TaskType, error = %err, "catalog sync failed");
        })?;
        let users = self.sync_users().await.inspect_err(|err| {
            error!(catalog = %CatalogKind::User, error = %err, "catalog sync failed");
        })?;
        Ok(CatalogSyncSummary {
            offices,
            task_types: task_types.combined(),
            users,
        })
    }

    async fn sync(&self, kind: CatalogKind) -> CatalogResult<()> {
        match kind {
            CatalogKind::Office => self.sync_offices().await.map(|_| ()),
            CatalogKind::User => self.sync_users().await.map(|_| ()),
            CatalogKind::TaskType => self.sync_task_types().await.map(|_| ()),
        }
    }

    async fn reconcile(
        &self,
        kind: CatalogKind,
        entries: &[MirrorEntry],
    ) -> CatalogResult<SyncReport> {
        if entries.is_empty() {
            warn!(catalog = %kind, "remote listed no entries; mirror left untouched");
            return Ok(SyncReport::default());
        }
        let mut report = self.upsert_all(entries).await?;
        let present: HashSet<ExternalId> = entries.iter().map(|entry| entry.external_id).collect();
        report.deactivated = self.mirror.mark_inactive_if_absent(kind, &present).await?;
        self.refresh_cache(kind, entries.iter().cloned());
        info!(
            catalog = %kind,
            inserted = report.inserted,
            updated = report.updated,
            deactivated = report.deactivated,
            "catalog synchronized"
        );
        Ok(report)
    }

    async fn upsert_all(&self, entries: &[MirrorEntry]) -> CatalogResult<SyncReport> {
        let mut report = SyncReport::default();
        for entry in entries {
            match self
                .mirror
                .find_by_external_id(entry.kind, entry.external_id)
                .await?
            {
                None => {
                    self.mirror.insert(entry).await?;
                    report.inserted += 1;
                }
                Some(existing) if existing != *entry => {
                    self.mirror.update(entry).await?;
                    report.updated += 1;
                }
                Some(_) => {}
            }
        }
        Ok(report)
    }

    fn refresh_cache(&self, kind: CatalogKind, entries: impl IntoIterator<Item = MirrorEntry>) {
        let cached = self.cache.populate(
            kind.as_str(),
            entries.into_iter().filter(|entry| entry.is_active),
            |entry| Some(entry.external_id),
        );
        info!(catalog = %kind, cached, "catalog cache refreshed");
    }
}

#[async_trait]
impl<R, M, C> CatalogLookup for CatalogService<R, M, C>
where
    R: RemoteSystem,
    M: CatalogMirror,
    C: Clock + Send + Sync,
{
    async fn find_active(
        &self,
        kind: CatalogKind,
        external_id: ExternalId,
    ) -> CatalogResult<Option<MirrorEntry>> {
        if self.cache.is_stale(kind.as_str())
            && let Err(err) = self.sync(kind).await
        {
            warn!(catalog = %kind, error = %err, "catalog refresh failed; reading the mirror");
        }
        if let Some(entry) = self.cache.get(kind.as_str(), &external_id) {
            return Ok(Some(entry));
        }
        let stored = self.mirror.find_by_external_id(kind, external_id).await?;
        Ok(stored.filter(|entry| entry.is_active))
    }
}
