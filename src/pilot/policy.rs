//! Pilot selection policies

use serde::{Deserialize, Serialize};

/// How the pilot subset is drawn from a collection.
///
/// Every policy is reproducible: the same collection and seed always
/// select the same incidents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// The `limit` incidents with the most reference texts; ties broken by seeded shuffle
    MostReferenceTexts { limit: usize },
    /// Up to `per_language` seeded picks among incidents covering each collection language
    StratifiedByLanguage { per_language: usize },
    /// A seeded uniform sample of `limit` incidents
    Random { limit: usize },
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::MostReferenceTexts { limit: 50 }
    }
}

impl std::fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MostReferenceTexts { limit } => write!(f, "most-reference-texts(limit={})", limit),
            Self::StratifiedByLanguage { per_language } => {
                write!(f, "stratified-by-language(per_language={})", per_language)
            }
            Self::Random { limit } => write!(f, "random(limit={})", limit),
        }
    }
}
