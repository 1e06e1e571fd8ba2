//! Domain model for batch execution tracking.
//!
//! An [`ExecutionRecord`] counts successes and failures as items are
//! recorded and never reports more finished items than planned ones.

mod ids;
mod item;
mod record;
mod request;
mod source;

pub use ids::ExecutionId;
pub use item::{BatchItem, ExecutionItem, ItemStatus, ParseItemStatusError};
pub use record::{ExecutionRecord, PersistedExecutionData};
pub use request::{BatchRequest, SheetTable};
pub use source::{ParseTaskSourceError, TaskSource};
