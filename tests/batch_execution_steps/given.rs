//! Given steps for batch execution BDD scenarios.

use super::world::BatchWorld;
use casebridge::batch::domain::BatchRequest;
use casebridge::remote::domain::ExternalId;
use rstest_bdd_macros::given;

const REQUESTING_USER: i64 = 77;

#[given(r#"the remote system knows case "{identifier}" in office {office:i64}"#)]
fn remote_knows_case(world: &mut BatchWorld, identifier: String, office: i64) {
    world.register_case(&identifier, office);
}

#[given(r#"a "{source}" batch for cases "{first}" and "{second}""#)]
fn batch_for_cases(world: &mut BatchWorld, source: String, first: String, second: String) {
    let request =
        BatchRequest::from_case_identifiers([first, second], ExternalId::new(REQUESTING_USER));
    world.pending = Some((source, request));
}
