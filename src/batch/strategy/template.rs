//! Task description templates.

use super::ItemFailure;
use crate::batch::domain::{BatchItem, TaskSource};
use chrono::NaiveDate;
use minijinja::Environment;
use serde::Serialize;

/// `minijinja` template rendering a task description for one item.
///
/// Templates see `case_identifier`, `source`, `notes`, and `deadline`
/// (an ISO date).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionTemplate {
    source: String,
}

#[derive(Serialize)]
struct DescriptionContext<'a> {
    case_identifier: &'a str,
    source: &'a str,
    notes: Option<&'a str>,
    deadline: String,
}

impl DescriptionTemplate {
    /// Creates a template from its source text.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Renders the description of `item`.
    ///
    /// # Errors
    ///
    /// Returns [`ItemFailure::Validation`] when the template cannot be
    /// rendered.
    pub fn render(
        &self,
        item: &BatchItem,
        source: TaskSource,
        deadline: NaiveDate,
    ) -> Result<String, ItemFailure> {
        let context = DescriptionContext {
            case_identifier: item.case_identifier.trim(),
            source: source.as_str(),
            notes: item.notes.as_deref(),
            deadline: deadline.to_string(),
        };
        Environment::new()
            .render_str(&self.source, context)
            .map(|rendered| rendered.trim().to_owned())
            .map_err(|err| ItemFailure::Validation(format!("description template failed: {err}")))
    }
}
