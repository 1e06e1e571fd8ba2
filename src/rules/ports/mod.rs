//! Port contracts for rule storage.

pub mod repository;

pub use repository::{CoRequisiteRuleRepository, RuleRepositoryError, RuleRepositoryResult};
