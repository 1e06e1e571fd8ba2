//! Domain model for the catalog mirror.

mod entry;

pub use entry::{CatalogKind, MirrorEntry, SyncReport};
