//! Batch submission payloads.

use super::BatchItem;
use crate::remote::domain::ExternalId;
use serde::{Deserialize, Serialize};

/// Table extracted from an uploaded spreadsheet.
///
/// Cells are kept as text; blank cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetTable {
    /// Column headers in order.
    pub header: Vec<String>,
    /// Data rows in order.
    pub rows: Vec<Vec<Option<String>>>,
}

impl SheetTable {
    /// Creates a table from string cells, treating blank cells as missing.
    #[must_use]
    pub fn from_text_rows<H, R, C>(header: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|cell| {
                            let text = cell.as_ref().trim();
                            (!text.is_empty()).then(|| text.to_owned())
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

/// Batch submitted to the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Items to process, in order.
    pub items: Vec<BatchItem>,
    /// Responsible user applied to items that name none.
    pub responsible_user_id: Option<ExternalId>,
    /// Attached table, parsed by table-driven strategies.
    pub table: Option<SheetTable>,
}

impl BatchRequest {
    /// Creates a request from items.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = BatchItem>) -> Self {
        Self {
            items: items.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Creates a request for case identifiers sharing one responsible user.
    #[must_use]
    pub fn from_case_identifiers<I>(identifiers: I, responsible_user_id: ExternalId) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            items: identifiers.into_iter().map(BatchItem::new).collect(),
            responsible_user_id: Some(responsible_user_id),
            table: None,
        }
    }

    /// Creates a request carrying an attached table.
    #[must_use]
    pub fn from_table(table: SheetTable) -> Self {
        Self {
            table: Some(table),
            ..Self::default()
        }
    }

    /// Returns the item count known before processing: `0` while a table is
    /// attached, otherwise the number of items.
    #[must_use]
    pub fn provisional_total(&self) -> usize {
        if self.table.is_some() {
            0
        } else {
            self.items.len()
        }
    }
}
