//! Read-only repository port for co-requisite rules.

use crate::remote::domain::ExternalId;
use crate::rules::domain::CoRequisiteRule;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Result type for rule repository operations.
pub type RuleRepositoryResult<T> = Result<T, RuleRepositoryError>;

/// Rule storage contract.
#[async_trait]
pub trait CoRequisiteRuleRepository: Send + Sync {
    /// Returns every stored rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleRepositoryError::Persistence`] when the store cannot be
    /// read.
    async fn list_rules(&self) -> RuleRepositoryResult<Vec<CoRequisiteRule>>;

    /// Returns subtype display names keyed by subtype identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RuleRepositoryError::Persistence`] when the store cannot be
    /// read.
    async fn subtype_names(&self) -> RuleRepositoryResult<BTreeMap<ExternalId, String>>;
}

/// Errors returned by rule repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RuleRepositoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RuleRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
