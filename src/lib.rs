//! incident-corpus: harvests incidents and reconciles their reference texts
//!
//! Incidents (elections, killings, ...) come from a structured knowledge base.
//! Their reference texts arrive through several discovery channels and are
//! reconciled into one canonical, deduplicated set per incident before a
//! reproducible pilot subset is selected for costlier enrichment.
//!
//! # Core Concepts
//!
//! - **Incident**: an event instance with its ordered reference texts
//! - **ReferenceText**: an article, tagged with the channels that found it
//! - **IncidentCollection**: all incidents of one type for one language set
//! - **Pilot**: a seeded subset of a collection
//!
//! # Example
//!
//! ```
//! use incident_corpus::model::{Provenance, ReferenceText};
//! use incident_corpus::reconcile::merge;
//!
//! let existing = vec![ReferenceText::new("Foo", "en", Provenance::Sparql)];
//! let merged = merge(existing, [("en", "Foo", Provenance::Api)]);
//! assert_eq!(merged.len(), 1);
//! assert_eq!(merged[0].found_by.as_slice(), &[Provenance::Sparql, Provenance::Api]);
//! ```

pub mod annotate;
pub mod assemble;
pub mod config;
pub mod crawl;
mod error;
pub mod hydrate;
pub mod links;
pub mod model;
pub mod pilot;
pub mod pipeline;
pub mod reconcile;
pub mod services;
pub mod storage;

pub use config::{ConfigError, LanguageInfo, LanguageTable, PipelineConfig};
pub use error::{PipelineError, PipelineResult};
pub use model::{FoundBy, Incident, IncidentCollection, Provenance, ReferenceText};
pub use pilot::{PilotSelector, SelectionPolicy};
pub use pipeline::{Pipeline, PipelineServices, RunReport, UnitOutcome, UnitSummary};
pub use storage::{CollectionKey, CollectionStore, OpenStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
