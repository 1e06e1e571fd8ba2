//! Shared world state for batch execution BDD scenarios.

use std::sync::Arc;

use casebridge::batch::{
    adapters::memory::InMemoryExecutionRepository,
    domain::{BatchRequest, ExecutionRecord},
    services::{BatchOrchestrator, BatchOrchestratorError},
    strategy::StrategyRegistry,
};
use casebridge::catalog::{adapters::memory::InMemoryCatalogMirror, services::CatalogService};
use casebridge::config::BatchConfig;
use casebridge::remote::{
    adapters::memory::InMemoryRemoteSystem,
    domain::{ExternalId, RemoteTaskSubtype, RemoteTaskType, TaskTypeCatalog},
};
use chrono::TimeDelta;
use mockable::DefaultClock;
use rstest::fixture;

/// Orchestrator type used by the BDD world.
pub type WorldOrchestrator = BatchOrchestrator<InMemoryExecutionRepository, DefaultClock>;

/// Scenario world for batch execution behaviour tests.
pub struct BatchWorld {
    pub remote: InMemoryRemoteSystem,
    pub orchestrator: WorldOrchestrator,
    pub pending: Option<(String, BatchRequest)>,
    pub last_record: Option<ExecutionRecord>,
    pub last_error: Option<BatchOrchestratorError>,
    next_lawsuit_id: i64,
}

impl BatchWorld {
    /// Creates a world whose remote system lists the default task subtype.
    #[must_use]
    pub fn new() -> Self {
        let remote = InMemoryRemoteSystem::new();
        remote.set_task_types(TaskTypeCatalog {
            types: vec![RemoteTaskType {
                id: ExternalId::new(26),
                name: "Subsidy".to_owned(),
            }],
            subtypes: vec![RemoteTaskSubtype {
                id: ExternalId::new(1_132),
                name: "Subsidy fulfilled".to_owned(),
                parent_type_id: Some(ExternalId::new(26)),
            }],
        });
        let clock = Arc::new(DefaultClock);
        let catalog = Arc::new(CatalogService::new(
            Arc::new(remote.clone()),
            Arc::new(InMemoryCatalogMirror::new()),
            Arc::clone(&clock),
            TimeDelta::hours(1),
        ));
        let settings = BatchConfig {
            item_interval_ms: 0,
            ..BatchConfig::default()
        };
        let registry =
            StrategyRegistry::standard(Arc::new(remote.clone()), catalog, settings, Arc::clone(&clock))
                .expect("default batch settings are valid");
        let orchestrator = BatchOrchestrator::new(
            Arc::new(InMemoryExecutionRepository::new()),
            registry,
            clock,
        );

        Self {
            remote,
            orchestrator,
            pending: None,
            last_record: None,
            last_error: None,
            next_lawsuit_id: 500,
        }
    }

    /// Registers `identifier` with the remote system under a fresh lawsuit id.
    pub fn register_case(&mut self, identifier: &str, office: i64) {
        self.next_lawsuit_id += 1;
        self.remote
            .add_lawsuit(identifier, self.next_lawsuit_id, Some(office));
    }
}

impl Default for BatchWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BatchWorld {
    BatchWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
