//! When steps for batch execution BDD scenarios.

use super::world::{BatchWorld, run_async};
use eyre::{WrapErr, eyre};
use rstest_bdd_macros::when;

#[when("the batch is submitted")]
fn batch_is_submitted(world: &mut BatchWorld) -> Result<(), eyre::Report> {
    let (source, request) = world
        .pending
        .take()
        .ok_or_else(|| eyre!("missing pending batch in scenario world"))?;
    match run_async(world.orchestrator.submit(&source, &request)) {
        Ok(record) => world.last_record = Some(record),
        Err(err) => world.last_error = Some(err),
    }
    Ok(())
}

#[when(r#"the remote system learns case "{identifier}" in office {office:i64}"#)]
fn remote_learns_case(world: &mut BatchWorld, identifier: String, office: i64) {
    world.register_case(&identifier, office);
}

#[when("the failed items are retried")]
fn failed_items_are_retried(world: &mut BatchWorld) -> Result<(), eyre::Report> {
    let previous = world
        .last_record
        .as_ref()
        .ok_or_else(|| eyre!("missing execution to retry"))?
        .id();
    let retried = run_async(world.orchestrator.retry_failed(previous))
        .wrap_err("retry failed items")?;
    world.last_record = Some(retried);
    Ok(())
}
