//! Strategy for rows of an uploaded spreadsheet.

use super::{
    BatchOutcome, BatchStrategy, DescriptionTemplate, ExecutionJournal, ItemFailure,
    StrategyError, TaskDraft, TaskItemPipeline, TaskWindow,
};
use crate::batch::domain::{BatchItem, BatchRequest, SheetTable, TaskSource};
use crate::config::{BatchConfig, ConfigError};
use crate::remote::domain::ExternalId;
use async_trait::async_trait;
use chrono::FixedOffset;
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// Leading columns every uploaded table must carry, in order.
pub const SPREADSHEET_HEADER: [&str; 3] = ["CNJ", "ID_RESPONSAVEL", "OBSERVACAO"];

const DESCRIPTION: &str =
    "Automatic task: scheduled via spreadsheet for case {{ case_identifier }}";

/// Creates one task per table row, due at the end of the next business day
/// on the office calendar.
///
/// The execution total is provisional until the table is parsed. Rows that
/// lack a case identifier or a valid responsible user are recorded as
/// failures; blank rows are skipped. A request without a table is processed
/// from its items, which is how failed rows are retried.
pub struct SpreadsheetStrategy<C>
where
    C: Clock + Send + Sync,
{
    pipeline: TaskItemPipeline,
    settings: BatchConfig,
    offset: FixedOffset,
    template: DescriptionTemplate,
    clock: Arc<C>,
}

impl<C> SpreadsheetStrategy<C>
where
    C: Clock + Send + Sync,
{
    /// Creates the strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the configured office offset is
    /// out of range.
    pub fn new(
        pipeline: TaskItemPipeline,
        settings: BatchConfig,
        clock: Arc<C>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            pipeline,
            offset: settings.local_offset()?,
            settings,
            template: DescriptionTemplate::new(DESCRIPTION),
            clock,
        })
    }

    fn draft(&self, item: &BatchItem, window: TaskWindow) -> Result<TaskDraft, ItemFailure> {
        let responsible_user_id = item.responsible_user_id.ok_or_else(|| {
            ItemFailure::Validation("ID_RESPONSAVEL is missing or not a numeric user id".to_owned())
        })?;
        Ok(TaskDraft {
            responsible_user_id,
            type_id: Some(ExternalId::new(self.settings.task_type_id)),
            subtype_id: ExternalId::new(self.settings.task_subtype_id),
            status_id: self.settings.task_status_id,
            description: self.template.render(
                item,
                TaskSource::Spreadsheet,
                window.deadline.with_timezone(&self.offset).date_naive(),
            )?,
            notes: item.notes.clone(),
            window,
        })
    }
}

/// Reads table rows into items.
///
/// # Errors
///
/// Returns [`StrategyError::InvalidPayload`] when the header does not start
/// with [`SPREADSHEET_HEADER`].
pub(crate) fn parse_table(table: &SheetTable) -> Result<Vec<BatchItem>, StrategyError> {
    let leading: Vec<&str> = table
        .header
        .iter()
        .take(SPREADSHEET_HEADER.len())
        .map(|column| column.trim())
        .collect();
    if leading != SPREADSHEET_HEADER {
        return Err(StrategyError::InvalidPayload(format!(
            "spreadsheet header must start with {}; found {}",
            SPREADSHEET_HEADER.join(", "),
            table.header.join(", ")
        )));
    }

    let (blank, filled): (Vec<_>, Vec<_>) = table
        .rows
        .iter()
        .partition(|row| row.iter().all(Option::is_none));
    if !blank.is_empty() {
        warn!(skipped = blank.len(), "blank spreadsheet rows skipped");
    }
    Ok(filled.into_iter().map(|row| row_to_item(row)).collect())
}

fn row_to_item(row: &[Option<String>]) -> BatchItem {
    let cell = |index: usize| row.get(index).and_then(Option::as_deref);
    BatchItem {
        case_identifier: cell(0).unwrap_or_default().to_owned(),
        responsible_user_id: cell(1).and_then(parse_user_id),
        notes: cell(2).map(str::to_owned),
        subtype_id: None,
    }
}

/// Parses a user id cell, accepting the `42.0` form numeric cells export as.
fn parse_user_id(cell: &str) -> Option<ExternalId> {
    let trimmed = cell.trim();
    trimmed
        .strip_suffix(".0")
        .unwrap_or(trimmed)
        .parse::<i64>()
        .ok()
        .map(ExternalId::new)
}

#[async_trait]
impl<C> BatchStrategy for SpreadsheetStrategy<C>
where
    C: Clock + Send + Sync,
{
    fn source(&self) -> TaskSource {
        TaskSource::Spreadsheet
    }

    async fn process_batch(
        &self,
        request: &BatchRequest,
        journal: &mut ExecutionJournal<'_>,
    ) -> Result<BatchOutcome, StrategyError> {
        let items = match &request.table {
            Some(table) => parse_table(table)?,
            None => request.items.clone(),
        };
        info!(rows = items.len(), "processing spreadsheet batch");
        journal.plan(&items).await?;

        let window = TaskWindow::end_of_next_business_day(self.clock.utc(), self.offset);
        self.pipeline
            .process(journal, |item| self.draft(item, window))
            .await
    }
}
