//! Application services for catalog synchronization and lookup.

mod sync;

pub use sync::{CatalogService, CatalogSyncSummary, TaskTypeSyncReport};
