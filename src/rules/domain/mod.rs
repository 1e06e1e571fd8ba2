//! Domain model for co-requisite rules.

mod rule;

pub use rule::{CoRequisiteRule, RuleViolation};
