//! Incident collections: one per (incident type, language set) run

use super::incident::Incident;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Language tag appended to mark a pilot collection
pub const PILOT_TAG: &str = "pilot";

/// All incidents of one type harvested for one language set.
///
/// `wdt_id` is unique among `incidents`. A collection is built once and not
/// mutated after it has been persisted; the pilot variant is a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentCollection {
    pub incidents: Vec<Incident>,
    pub incident_type: String,
    /// Knowledge-base URI of the incident type
    pub incident_type_uri: String,
    /// Requested language codes, optionally followed by [`PILOT_TAG`]
    pub languages: Vec<String>,
    /// Crate version that assembled the collection
    pub version: String,
    pub created_at: DateTime<Utc>,
}

impl IncidentCollection {
    /// Assemble a collection. Incidents repeating an earlier `wdt_id` are dropped.
    pub fn new(
        incident_type: impl Into<String>,
        incident_type_uri: impl Into<String>,
        languages: Vec<String>,
        incidents: Vec<Incident>,
    ) -> Self {
        let mut seen = HashSet::new();
        let total = incidents.len();
        let incidents: Vec<Incident> = incidents
            .into_iter()
            .filter(|incident| seen.insert(incident.wdt_id.clone()))
            .collect();
        if incidents.len() < total {
            tracing::debug!(
                dropped = total - incidents.len(),
                "dropped incidents with repeated identifiers"
            );
        }

        Self {
            incidents,
            incident_type: incident_type.into(),
            incident_type_uri: incident_type_uri.into(),
            languages,
            version: crate::VERSION.to_string(),
            created_at: Utc::now(),
        }
    }

    /// A new collection with this one's metadata, the given incidents, and
    /// [`PILOT_TAG`] appended to the languages.
    pub fn pilot_variant(&self, incidents: Vec<Incident>) -> Self {
        let mut languages = self.languages.clone();
        if !self.is_pilot() {
            languages.push(PILOT_TAG.to_string());
        }
        Self::new(
            self.incident_type.clone(),
            self.incident_type_uri.clone(),
            languages,
            incidents,
        )
    }

    pub fn is_pilot(&self) -> bool {
        self.languages.iter().any(|l| l == PILOT_TAG)
    }

    /// Requested language codes without the pilot tag
    pub fn content_languages(&self) -> impl Iterator<Item = &str> {
        self.languages
            .iter()
            .map(String::as_str)
            .filter(|l| *l != PILOT_TAG)
    }

    /// File stem shared by every artifact of this collection, e.g. `election_en_nl_pilot`
    pub fn output_stem(&self) -> String {
        output_stem(&self.incident_type, &self.languages)
    }

    pub fn incident(&self, wdt_id: &str) -> Option<&Incident> {
        self.incidents.iter().find(|i| i.wdt_id == wdt_id)
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    pub fn reference_text_count(&self) -> usize {
        self.incidents.iter().map(|i| i.reference_texts.len()).sum()
    }
}

/// `<incident_type>_<lang>_<lang>...`
pub fn output_stem(incident_type: &str, languages: &[String]) -> String {
    std::iter::once(incident_type)
        .chain(languages.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("_")
}
