//! Data exchanged with external services

use crate::model::ExtraInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Language code → article title
pub type TitlesByLanguage = BTreeMap<String, String>;

/// Short incident id → titles found for it
pub type TitleMap = BTreeMap<String, TitlesByLanguage>;

/// Property mapping handed to the query service (knowledge-base property → label)
pub type PropertyMapping = serde_json::Value;

/// Failure of a single external call.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for external calls
pub type ServiceResult<T> = Result<T, ServiceError>;

/// One knowledge-base query result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRow {
    /// Fully-qualified incident identifier (e.g., `http://www.wikidata.org/entity/Q42`)
    pub id: String,
    #[serde(default)]
    pub extra_info: ExtraInfo,
    /// Encyclopedia article title per language
    #[serde(default)]
    pub references: TitlesByLanguage,
    /// URI of the incident type
    pub type_id: String,
}

/// What the hydration service made of one title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HydrationOutcome {
    Hydrated {
        content: String,
        #[serde(default)]
        annotations: Option<serde_json::Value>,
    },
    Failed {
        reason: String,
    },
}

/// One row of the archive's snapshot index for a URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Archive timestamp, `YYYYMMDDhhmmss`
    pub timestamp: String,
    /// URL as originally captured
    pub original: String,
    /// HTTP status at capture time; `None` for revisit records
    pub status_code: Option<u16>,
}

impl Snapshot {
    pub fn archive_url(&self) -> String {
        format!("http://web.archive.org/web/{}/{}", self.timestamp, self.original)
    }
}

/// Article extracted from a fetched page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchedArticle {
    /// URL the article was read from
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub date_publish: Option<DateTime<Utc>>,
}
