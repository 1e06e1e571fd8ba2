//! Rule definitions and violations.

use crate::remote::domain::ExternalId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Requirement that `primary` is never submitted without `secondary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoRequisiteRule {
    /// Subtype that triggers the rule.
    pub primary: ExternalId,
    /// Subtype required alongside the primary.
    pub secondary: ExternalId,
    /// Human-readable explanation.
    pub description: Option<String>,
}

impl CoRequisiteRule {
    /// Creates a rule without a description.
    #[must_use]
    pub const fn new(primary: ExternalId, secondary: ExternalId) -> Self {
        Self {
            primary,
            secondary,
            description: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Submission that selects a primary subtype without all its requirements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "task subtype {primary_label} requires the following subtypes as well: {}",
    .missing_labels.join(", ")
)]
pub struct RuleViolation {
    /// Primary subtype whose requirements are unmet.
    pub primary: ExternalId,
    /// Missing subtypes in ascending order.
    pub missing: Vec<ExternalId>,
    /// Display label of the primary subtype.
    pub primary_label: String,
    /// Display labels of the missing subtypes, in the order of `missing`.
    pub missing_labels: Vec<String>,
}
