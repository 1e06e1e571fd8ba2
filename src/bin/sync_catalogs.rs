//! Copies the remote catalogs into a local mirror and logs what changed.
//!
//! Usage:
//!
//! ```text
//! sync_catalogs [config-path]
//! ```
//!
//! Without a path, settings load from `CASEBRIDGE_*` environment variables.
//! With a path, the file must hold a JSON [`IntegrationConfig`], for example:
//!
//! ```json
//! {
//!   "remote": {
//!     "base_url": "https://api.example.com/legalone/v1/api/rest",
//!     "client_id": "integration",
//!     "client_secret": "secret",
//!     "page_size": 50
//!   },
//!   "batch": {
//!     "local_utc_offset_hours": -3
//!   }
//! }
//! ```
//!
//! Offices, task types, and users are synchronized in that order. The mirror
//! lives in memory, so the run doubles as a connectivity and data check.

use casebridge::catalog::{
    adapters::memory::InMemoryCatalogMirror,
    domain::CatalogKind,
    ports::{CatalogError, CatalogMirror, CatalogMirrorError},
    services::CatalogService,
};
use casebridge::config::{ConfigError, IntegrationConfig};
use casebridge::remote::{adapters::http::RemoteSystemClient, domain::RemoteError};
use casebridge::telemetry::init_tracing;
use mockable::DefaultClock;
use std::env;
use std::fs;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tracing::info;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while running a sync.
#[derive(Debug, Error)]
enum SyncError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("failed to read settings file: {0}")]
    ConfigRead(#[source] std::io::Error),
    #[error("invalid settings: {0}")]
    Config(#[from] ConfigError),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] std::io::Error),
    #[error("remote client setup failed: {0}")]
    Client(#[source] RemoteError),
    #[error("catalog sync failed: {0}")]
    Catalog(#[from] CatalogError),
    #[error("mirror read failed: {0}")]
    Mirror(#[from] CatalogMirrorError),
}

fn main() -> Result<(), BoxError> {
    init_tracing();
    let config = load_config(env::args().skip(1))?;
    let runtime = build_runtime()?;
    runtime.block_on(run(config)).map_err(Into::into)
}

fn load_config(mut args: impl Iterator<Item = String>) -> Result<IntegrationConfig, SyncError> {
    let path = args.next();
    if let Some(extra) = args.next() {
        return Err(SyncError::InvalidArgs(format!(
            "unexpected argument '{extra}'; expected at most a settings path"
        )));
    }
    match path {
        Some(settings_path) => {
            let document = fs::read(&settings_path).map_err(SyncError::ConfigRead)?;
            Ok(IntegrationConfig::from_json(&document)?)
        }
        None => Ok(IntegrationConfig::from_env()?),
    }
}

fn build_runtime() -> Result<Runtime, SyncError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(SyncError::RuntimeInit)
}

async fn run(config: IntegrationConfig) -> Result<(), SyncError> {
    let clock = Arc::new(DefaultClock);
    let remote = RemoteSystemClient::from_config(&config.remote, Arc::clone(&clock))
        .map_err(SyncError::Client)?;
    let mirror = Arc::new(InMemoryCatalogMirror::new());
    let service = CatalogService::new(
        Arc::new(remote),
        Arc::clone(&mirror),
        clock,
        config.remote.catalog_ttl(),
    );

    let summary = service.sync_all().await?;
    for (kind, report) in [
        (CatalogKind::Office, summary.offices),
        (CatalogKind::TaskType, summary.task_types),
        (CatalogKind::User, summary.users),
    ] {
        let mirrored = mirror.list(kind).await?;
        let active = mirrored.iter().filter(|entry| entry.is_active).count();
        info!(
            catalog = %kind,
            inserted = report.inserted,
            updated = report.updated,
            deactivated = report.deactivated,
            mirrored = mirrored.len(),
            active,
            "catalog report"
        );
    }
    Ok(())
}
