//! Services that replay previously recorded responses
//!
//! A `RecordedSources` file captures what the knowledge base, the title API,
//! the encyclopedia snapshot, and the link lookup returned for a run. Replaying
//! it makes pipeline runs reproducible offline.

use super::traits::{HydrationService, LinkLookupService, QueryService, TitleLookupService};
use super::types::{
    HydrationOutcome, PropertyMapping, QueryRow, ServiceError, ServiceResult, TitleMap,
};
use crate::config::LanguageInfo;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A hydrated article as recorded from the encyclopedia snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedArticle {
    pub name: String,
    pub language: String,
    pub content: String,
    #[serde(default)]
    pub annotations: Option<serde_json::Value>,
}

/// External links recorded for one article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedLinks {
    pub name: String,
    pub language: String,
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedSources {
    /// Query rows per incident type label
    #[serde(default)]
    pub incidents: BTreeMap<String, Vec<QueryRow>>,
    #[serde(default)]
    pub titles: TitleMap,
    #[serde(default)]
    pub articles: Vec<RecordedArticle>,
    #[serde(default)]
    pub links: Vec<RecordedLinks>,
}

impl RecordedSources {
    pub fn load(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ServiceError::Unavailable(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl QueryService for RecordedSources {
    async fn query(
        &self,
        type_label: &str,
        languages: &[String],
        _mapping: &PropertyMapping,
        limit: usize,
    ) -> ServiceResult<Vec<QueryRow>> {
        let rows = self.incidents.get(type_label).map(Vec::as_slice).unwrap_or_default();
        Ok(rows
            .iter()
            .map(|row| QueryRow {
                references: row
                    .references
                    .iter()
                    .filter(|(lang, _)| languages.contains(lang))
                    .map(|(lang, name)| (lang.clone(), name.clone()))
                    .collect(),
                ..row.clone()
            })
            .take(limit)
            .collect())
    }
}

#[async_trait]
impl TitleLookupService for RecordedSources {
    async fn lookup_titles(&self, ids: &[String], languages: &[String]) -> ServiceResult<TitleMap> {
        Ok(ids
            .iter()
            .filter_map(|id| {
                let titles = self.titles.get(id)?;
                let titles: BTreeMap<_, _> = titles
                    .iter()
                    .filter(|(lang, _)| languages.contains(lang))
                    .map(|(lang, name)| (lang.clone(), name.clone()))
                    .collect();
                (!titles.is_empty()).then(|| (id.clone(), titles))
            })
            .collect())
    }
}

#[async_trait]
impl HydrationService for RecordedSources {
    async fn hydrate(
        &self,
        name: &str,
        language: &str,
        _info: &LanguageInfo,
    ) -> ServiceResult<HydrationOutcome> {
        Ok(self
            .articles
            .iter()
            .find(|a| a.name == name && a.language == language)
            .map(|a| HydrationOutcome::Hydrated {
                content: a.content.clone(),
                annotations: a.annotations.clone(),
            })
            .unwrap_or_else(|| HydrationOutcome::Failed {
                reason: "page not in snapshot".to_string(),
            }))
    }
}

#[async_trait]
impl LinkLookupService for RecordedSources {
    async fn lookup_primary_links(&self, name: &str, language: &str) -> ServiceResult<Option<Vec<String>>> {
        Ok(self
            .links
            .iter()
            .find(|l| l.name == name && l.language == language)
            .map(|l| l.links.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sources() -> RecordedSources {
        serde_json::from_value(json!({
            "incidents": {
                "election": [
                    {"id": "http://www.wikidata.org/entity/Q1", "references": {"en": "A", "it": "A_it"}, "type_id": "T"},
                    {"id": "http://www.wikidata.org/entity/Q2", "references": {"en": "B"}, "type_id": "T"}
                ]
            },
            "titles": {"Q1": {"nl": "A_nl"}, "Q2": {"en": "B"}},
            "articles": [{"name": "A", "language": "en", "content": "text A"}],
            "links": [{"name": "A", "language": "en", "links": ["http://x"]}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn query_filters_languages_and_applies_limit() {
        let rows = sources()
            .query("election", &["en".into()], &json!({}), 1)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].references.keys().collect::<Vec<_>>(), vec!["en"]);
    }

    #[tokio::test]
    async fn unknown_type_yields_no_rows() {
        let rows = sources().query("murder", &["en".into()], &json!({}), 10).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn titles_outside_requested_languages_are_omitted() {
        let titles = sources()
            .lookup_titles(&["Q1".into(), "Q2".into()], &["en".into()])
            .await
            .unwrap();
        assert!(!titles.contains_key("Q1"));
        assert_eq!(titles["Q2"]["en"], "B");
    }

    #[tokio::test]
    async fn missing_article_is_a_failed_hydration() {
        let info = LanguageInfo::default();
        let outcome = sources().hydrate("B", "en", &info).await.unwrap();
        assert!(matches!(outcome, HydrationOutcome::Failed { .. }));
    }
}
