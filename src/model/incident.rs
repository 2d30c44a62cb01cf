//! Incidents harvested from the knowledge base

use super::reference_text::ReferenceText;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form incident attributes (property label → value)
pub type ExtraInfo = BTreeMap<String, serde_json::Value>;

/// A real-world event instance and the articles describing it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Short knowledge-base identifier (e.g., "Q42")
    pub wdt_id: String,
    /// Categorical type tag (e.g., "election")
    pub incident_type: String,
    #[serde(default)]
    pub extra_info: ExtraInfo,
    /// Reference texts in discovery order
    #[serde(default)]
    pub reference_texts: Vec<ReferenceText>,
}

impl Incident {
    pub fn new(incident_type: impl Into<String>, wdt_id: impl Into<String>) -> Self {
        Self {
            wdt_id: wdt_id.into(),
            incident_type: incident_type.into(),
            extra_info: ExtraInfo::new(),
            reference_texts: Vec::new(),
        }
    }

    pub fn with_extra_info(mut self, extra_info: ExtraInfo) -> Self {
        self.extra_info = extra_info;
        self
    }

    pub fn with_reference_texts(mut self, reference_texts: Vec<ReferenceText>) -> Self {
        self.reference_texts = reference_texts;
        self
    }

    /// Whether any reference text is written in `language`
    pub fn has_language(&self, language: &str) -> bool {
        self.reference_texts.iter().any(|rt| rt.language == language)
    }

    pub fn reference_text(&self, name: &str, language: &str) -> Option<&ReferenceText> {
        self.reference_texts.iter().find(|rt| rt.matches(name, language))
    }
}
