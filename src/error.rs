//! Pipeline-level errors
//!
//! Per-record failures (hydration, link lookup, annotation, crawling) never
//! surface here; they are absorbed into the stage reports. A `PipelineError`
//! ends the (incident type, language set) unit it was raised in.

use crate::config::ConfigError;
use crate::services::ServiceError;
use crate::storage::StorageError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The incident assembler was handed zero query rows.
    #[error("cannot assemble incidents from an empty batch")]
    EmptyBatch,

    /// The pilot selector chose nothing for a non-empty or empty collection.
    #[error("no pilot incidents selected for type {incident_type}")]
    EmptyPilotSelection { incident_type: String },

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid property mapping {path}: {source}")]
    Mapping {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
