//! In-memory rule repository.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::remote::domain::ExternalId;
use crate::rules::{
    domain::CoRequisiteRule,
    ports::{CoRequisiteRuleRepository, RuleRepositoryError, RuleRepositoryResult},
};

/// Thread-safe in-memory rule store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCoRequisiteRuleRepository {
    state: Arc<RwLock<RuleState>>,
}

#[derive(Debug, Default)]
struct RuleState {
    rules: Vec<CoRequisiteRule>,
    names: BTreeMap<ExternalId, String>,
}

impl InMemoryCoRequisiteRuleRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `rules`.
    #[must_use]
    pub fn with_rules(rules: impl IntoIterator<Item = CoRequisiteRule>) -> Self {
        Self {
            state: Arc::new(RwLock::new(RuleState {
                rules: rules.into_iter().collect(),
                names: BTreeMap::new(),
            })),
        }
    }

    /// Adds a rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn add_rule(&self, rule: CoRequisiteRule) -> RuleRepositoryResult<()> {
        self.state.write().map_err(lock_error)?.rules.push(rule);
        Ok(())
    }

    /// Names a subtype for violation messages.
    ///
    /// # Errors
    ///
    /// Returns [`RuleRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn name_subtype(&self, id: ExternalId, name: impl Into<String>) -> RuleRepositoryResult<()> {
        self.state
            .write()
            .map_err(lock_error)?
            .names
            .insert(id, name.into());
        Ok(())
    }
}

fn lock_error(err: impl std::fmt::Display) -> RuleRepositoryError {
    RuleRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl CoRequisiteRuleRepository for InMemoryCoRequisiteRuleRepository {
    async fn list_rules(&self) -> RuleRepositoryResult<Vec<CoRequisiteRule>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.rules.clone())
    }

    async fn subtype_names(&self) -> RuleRepositoryResult<BTreeMap<ExternalId, String>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.names.clone())
    }
}
