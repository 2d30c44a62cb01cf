//! Storage backends for incident collections
//!
//! Collections are persisted through the `CollectionStore` trait.
//! The primary implementation is `SqliteStore`.

mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{
    CollectionKey, CollectionStore, CollectionSummary, OpenStore, StorageError, StorageResult,
};
