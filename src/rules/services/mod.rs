//! Rule validation service.

mod engine;

pub use engine::CoRequisiteRuleEngine;
