//! Then steps for batch execution BDD scenarios.

use super::world::{BatchWorld, run_async};
use casebridge::batch::{domain::ExecutionRecord, services::BatchOrchestratorError};
use eyre::{WrapErr, eyre};
use rstest_bdd_macros::then;

fn ensure_counts(
    record: &ExecutionRecord,
    total: usize,
    successes: usize,
    failures: usize,
) -> Result<(), eyre::Report> {
    let observed = (
        record.total_items(),
        record.success_count(),
        record.failure_count(),
    );
    if observed != (total, successes, failures) {
        return Err(eyre!(
            "expected (total, success, failure) = {:?}, found {observed:?}",
            (total, successes, failures)
        ));
    }
    if record.items().len() != total {
        return Err(eyre!(
            "expected {total} recorded items, found {}",
            record.items().len()
        ));
    }
    Ok(())
}

#[then(
    "the execution lists {total:usize} items with {successes:usize} successes and {failures:usize} failures"
)]
fn execution_lists(
    world: &BatchWorld,
    total: usize,
    successes: usize,
    failures: usize,
) -> Result<(), eyre::Report> {
    let record = world
        .last_record
        .as_ref()
        .ok_or_else(|| eyre!("missing execution record"))?;
    ensure_counts(record, total, successes, failures)
}

#[then("the execution is finished")]
fn execution_is_finished(world: &BatchWorld) -> Result<(), eyre::Report> {
    let record = world
        .last_record
        .as_ref()
        .ok_or_else(|| eyre!("missing execution record"))?;
    if !record.is_finished() {
        return Err(eyre!("execution {} is still running", record.id()));
    }
    Ok(())
}

#[then("{count:usize} remote tasks were created")]
fn remote_tasks_created(world: &BatchWorld, count: usize) -> Result<(), eyre::Report> {
    let created = world.remote.created_tasks().len();
    if created != count {
        return Err(eyre!("expected {count} created tasks, found {created}"));
    }
    Ok(())
}

#[then("the submission is rejected as an unknown source")]
fn submission_rejected(world: &BatchWorld) -> Result<(), eyre::Report> {
    match &world.last_error {
        Some(BatchOrchestratorError::UnknownSource { .. }) => Ok(()),
        other => Err(eyre!("expected an unknown source error, found {other:?}")),
    }
}

#[then(
    "the stored execution lists {total:usize} items with {successes:usize} successes and {failures:usize} failures"
)]
fn stored_execution_lists(
    world: &BatchWorld,
    total: usize,
    successes: usize,
    failures: usize,
) -> Result<(), eyre::Report> {
    let Some(BatchOrchestratorError::UnknownSource { execution_id, .. }) = &world.last_error
    else {
        return Err(eyre!("missing rejected execution"));
    };
    let record = run_async(world.orchestrator.find(*execution_id))
        .wrap_err("load rejected execution")?;
    ensure_counts(&record, total, successes, failures)
}
