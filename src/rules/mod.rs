//! Co-requisite rules between task subtypes.
//!
//! A rule states that selecting a primary subtype for a case requires a
//! secondary subtype in the same submission. Rules are loaded once into
//! [`services::CoRequisiteRuleEngine`], so validation does no I/O. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Validation service in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
