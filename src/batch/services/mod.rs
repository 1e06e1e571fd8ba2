//! Batch orchestration services.

mod orchestrator;

pub use orchestrator::{BatchOrchestrator, BatchOrchestratorError, BatchOrchestratorResult};
