//! Shared fixtures for batch tests.

use crate::batch::{
    adapters::memory::InMemoryExecutionRepository,
    domain::ExecutionRecord,
    services::BatchOrchestrator,
    strategy::StrategyRegistry,
};
use crate::catalog::{adapters::memory::InMemoryCatalogMirror, services::CatalogService};
use crate::config::BatchConfig;
use crate::remote::adapters::memory::InMemoryRemoteSystem;
use crate::remote::domain::{
    ExternalId, RemoteTaskSubtype, RemoteTaskType, TaskPayload, TaskTypeCatalog,
};
use crate::test_support::ManualClock;
use chrono::TimeDelta;
use rstest::fixture;
use std::sync::Arc;

pub const CASE_A: &str = "0001234-56.2024.8.26.0100";
pub const CASE_B: &str = "0007654-32.2023.8.26.0001";
pub const CASE_WITHOUT_OFFICE: &str = "0009999-00.2022.8.26.0500";
pub const MISSING_CASE: &str = "0000000-00.0000.0.00.0000";
pub const OFFICE: i64 = 9;
pub const RESPONSIBLE: i64 = 77;
pub const OTHER_TYPE: i64 = 30;
pub const OTHER_SUBTYPE: i64 = 2_000;

pub type TestOrchestrator = BatchOrchestrator<InMemoryExecutionRepository, ManualClock>;

pub struct BatchHarness {
    pub remote: InMemoryRemoteSystem,
    pub repository: Arc<InMemoryExecutionRepository>,
    pub orchestrator: TestOrchestrator,
}

impl BatchHarness {
    pub fn created_payloads(&self) -> Vec<TaskPayload> {
        self.remote
            .created_tasks()
            .into_iter()
            .map(|(_, payload)| payload)
            .collect()
    }

    pub async fn stored(&self, record: &ExecutionRecord) -> ExecutionRecord {
        self.orchestrator
            .find(record.id())
            .await
            .expect("execution is stored")
    }
}

pub fn settings() -> BatchConfig {
    BatchConfig {
        item_interval_ms: 0,
        ..BatchConfig::default()
    }
}

pub fn task_types() -> TaskTypeCatalog {
    TaskTypeCatalog {
        types: vec![
            RemoteTaskType {
                id: ExternalId::new(26),
                name: "Subsidy".to_owned(),
            },
            RemoteTaskType {
                id: ExternalId::new(OTHER_TYPE),
                name: "Hearing".to_owned(),
            },
        ],
        subtypes: vec![
            RemoteTaskSubtype {
                id: ExternalId::new(1_132),
                name: "Subsidy fulfilled".to_owned(),
                parent_type_id: Some(ExternalId::new(26)),
            },
            RemoteTaskSubtype {
                id: ExternalId::new(OTHER_SUBTYPE),
                name: "Hearing prep".to_owned(),
                parent_type_id: Some(ExternalId::new(OTHER_TYPE)),
            },
        ],
    }
}

pub fn seeded_remote() -> InMemoryRemoteSystem {
    let remote = InMemoryRemoteSystem::new();
    remote.set_task_types(task_types());
    remote.add_lawsuit(CASE_A, 501, Some(OFFICE));
    remote.add_lawsuit(CASE_B, 502, Some(OFFICE));
    remote.add_lawsuit(CASE_WITHOUT_OFFICE, 503, None);
    remote
}

#[fixture]
pub fn harness() -> BatchHarness {
    let remote = seeded_remote();
    let clock = Arc::new(ManualClock::midweek());
    let catalog = Arc::new(CatalogService::new(
        Arc::new(remote.clone()),
        Arc::new(InMemoryCatalogMirror::new()),
        Arc::clone(&clock),
        TimeDelta::hours(1),
    ));
    let registry = StrategyRegistry::standard(
        Arc::new(remote.clone()),
        catalog,
        settings(),
        Arc::clone(&clock),
    )
    .expect("default batch settings are valid");
    let repository = Arc::new(InMemoryExecutionRepository::new());
    let orchestrator = BatchOrchestrator::new(Arc::clone(&repository), registry, clock);
    BatchHarness {
        remote,
        repository,
        orchestrator,
    }
}
