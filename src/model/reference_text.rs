//! Reference texts: articles that describe an incident

use super::provenance::{FoundBy, Provenance};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A textual source document associated with an incident.
///
/// Within one incident, `(name, language)` identifies the logical
/// reference. `content` and `annotations` stay `None` until hydration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceText {
    /// Source locator
    #[serde(default)]
    pub uri: Option<String>,
    /// Archive snapshot of `uri`
    #[serde(default)]
    pub web_archive_uri: Option<String>,
    /// Article title
    pub name: String,
    /// ISO-639-1 language code
    pub language: String,
    /// Hydrated body text
    #[serde(default)]
    pub content: Option<String>,
    /// Publication date, when known
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
    /// Channels that surfaced this text
    #[serde(default)]
    pub found_by: FoundBy,
    /// Opaque payload from the hydration step
    #[serde(default)]
    pub annotations: Option<serde_json::Value>,
    /// Resolved external links cited by the text
    #[serde(default)]
    pub primary_ref_texts: Option<Vec<String>>,
}

impl ReferenceText {
    /// A not-yet-hydrated reference text discovered through `provenance`.
    pub fn new(name: impl Into<String>, language: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            uri: None,
            web_archive_uri: None,
            name: name.into(),
            language: language.into(),
            content: None,
            creation_date: None,
            found_by: FoundBy::single(provenance),
            annotations: None,
            primary_ref_texts: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_found_by(mut self, found_by: FoundBy) -> Self {
        self.found_by = found_by;
        self
    }

    /// Whether this record is the logical reference `(name, language)`.
    pub fn matches(&self, name: &str, language: &str) -> bool {
        self.name == name && self.language == language
    }

    pub fn is_hydrated(&self) -> bool {
        self.content.is_some()
    }
}
