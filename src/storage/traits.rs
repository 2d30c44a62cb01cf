//! Storage trait definitions

use crate::model::{output_stem, IncidentCollection};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Identifies a stored collection: its incident type and language tags
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionKey {
    pub incident_type: String,
    pub languages: Vec<String>,
}

impl CollectionKey {
    pub fn new(incident_type: impl Into<String>, languages: Vec<String>) -> Self {
        Self {
            incident_type: incident_type.into(),
            languages,
        }
    }

    pub fn of(collection: &IncidentCollection) -> Self {
        Self::new(collection.incident_type.clone(), collection.languages.clone())
    }

    /// Stem shared with the collection's other artifacts
    pub fn stem(&self) -> String {
        output_stem(&self.incident_type, &self.languages)
    }
}

impl std::fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.stem())
    }
}

/// Listing entry for a stored collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionSummary {
    pub key: CollectionKey,
    pub incident_type_uri: String,
    pub incidents: usize,
    pub reference_texts: usize,
    pub version: String,
    pub created_at: DateTime<Utc>,
}

/// Trait for collection storage backends
///
/// Implementations must be thread-safe (Send + Sync).
pub trait CollectionStore: Send + Sync {
    /// Save a collection, replacing any stored under the same key
    fn save(&self, collection: &IncidentCollection) -> StorageResult<CollectionKey>;

    /// Load a collection by key
    fn load(&self, key: &CollectionKey) -> StorageResult<Option<IncidentCollection>>;

    /// Summaries of all stored collections, ordered by key
    fn list(&self) -> StorageResult<Vec<CollectionSummary>>;

    /// Delete a collection
    fn delete(&self, key: &CollectionKey) -> StorageResult<bool>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: CollectionStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
