//! Co-requisite validation over preloaded rules.

use crate::remote::domain::ExternalId;
use crate::rules::{
    domain::{CoRequisiteRule, RuleViolation},
    ports::{CoRequisiteRuleRepository, RuleRepositoryResult},
};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::hash::BuildHasher;
use tracing::{debug, info};

/// Validates subtype selections against co-requisite rules.
///
/// Rules are grouped by primary subtype once, at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoRequisiteRuleEngine {
    requirements: BTreeMap<ExternalId, BTreeSet<ExternalId>>,
    names: BTreeMap<ExternalId, String>,
}

impl CoRequisiteRuleEngine {
    /// Loads every rule and subtype name from `repository`.
    ///
    /// # Errors
    ///
    /// Returns the repository error when rules or names cannot be read.
    pub async fn load<R>(repository: &R) -> RuleRepositoryResult<Self>
    where
        R: CoRequisiteRuleRepository + ?Sized,
    {
        let rules = repository.list_rules().await?;
        let names = repository.subtype_names().await?;
        let engine = Self::from_parts(rules, names);
        info!(
            primaries = engine.requirements.len(),
            "co-requisite rules loaded"
        );
        Ok(engine)
    }

    /// Builds an engine from rules and subtype names.
    #[must_use]
    pub fn from_parts(
        rules: impl IntoIterator<Item = CoRequisiteRule>,
        names: BTreeMap<ExternalId, String>,
    ) -> Self {
        let mut requirements: BTreeMap<ExternalId, BTreeSet<ExternalId>> = BTreeMap::new();
        for rule in rules {
            requirements
                .entry(rule.primary)
                .or_default()
                .insert(rule.secondary);
        }
        Self {
            requirements,
            names,
        }
    }

    /// Returns `true` when no rule is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Returns the subtypes required by `primary`, if it has rules.
    #[must_use]
    pub fn requirements_of(&self, primary: ExternalId) -> Option<&BTreeSet<ExternalId>> {
        self.requirements.get(&primary)
    }

    /// Checks that every selected primary comes with all its requirements.
    ///
    /// Primaries are checked in ascending identifier order.
    ///
    /// # Errors
    ///
    /// Returns the [`RuleViolation`] of the first primary with missing
    /// requirements.
    pub fn validate<S>(&self, selected: &HashSet<ExternalId, S>) -> Result<(), RuleViolation>
    where
        S: BuildHasher,
    {
        for (primary, required) in &self.requirements {
            if !selected.contains(primary) {
                continue;
            }
            let missing: Vec<ExternalId> = required
                .iter()
                .filter(|subtype| !selected.contains(*subtype))
                .copied()
                .collect();
            if !missing.is_empty() {
                debug!(%primary, missing = missing.len(), "co-requisite rule violated");
                return Err(self.violation(*primary, missing));
            }
        }
        Ok(())
    }

    /// Validates a selection where some entries may have no subtype chosen.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn validate_selection(
        &self,
        selection: impl IntoIterator<Item = Option<ExternalId>>,
    ) -> Result<(), RuleViolation> {
        let selected: HashSet<ExternalId> = selection.into_iter().flatten().collect();
        self.validate(&selected)
    }

    fn label(&self, subtype: ExternalId) -> String {
        self.names
            .get(&subtype)
            .map_or_else(|| format!("#{subtype}"), |name| format!("'{name}'"))
    }

    fn violation(&self, primary: ExternalId, missing: Vec<ExternalId>) -> RuleViolation {
        RuleViolation {
            primary,
            primary_label: self.label(primary),
            missing_labels: missing.iter().map(|subtype| self.label(*subtype)).collect(),
            missing,
        }
    }
}
