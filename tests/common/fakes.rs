//! In-memory service fakes

use async_trait::async_trait;
use incident_corpus::services::{
    HydrationOutcome, HydrationService, LinkLookupService, PropertyMapping, QueryRow, QueryService,
    ServiceError, ServiceResult, TitleLookupService, TitleMap,
};
use incident_corpus::LanguageInfo;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct FakeServices {
    rows: BTreeMap<String, Vec<QueryRow>>,
    titles: TitleMap,
    articles: HashMap<(String, String), String>,
    links: HashMap<(String, String), Vec<String>>,
    failing_title_ids: HashSet<String>,
    failing_link_titles: HashSet<String>,
    /// Sizes of the id batches the title lookup received
    pub title_batches: Mutex<Vec<usize>>,
    /// Titles the link lookup was asked about
    pub link_lookups: Mutex<Vec<String>>,
}

#[derive(Default)]
pub struct FakeServicesBuilder {
    inner: FakeServices,
}

impl FakeServices {
    pub fn builder() -> FakeServicesBuilder {
        FakeServicesBuilder::default()
    }
}

impl FakeServicesBuilder {
    /// A query row for `incident_type` with the given per-language titles.
    pub fn incident(mut self, incident_type: &str, id: &str, refs: &[(&str, &str)]) -> Self {
        self.inner
            .rows
            .entry(incident_type.to_string())
            .or_default()
            .push(QueryRow {
                id: format!("http://www.wikidata.org/entity/{}", id),
                extra_info: BTreeMap::from([("sem:hasTimeStamp".to_string(), serde_json::json!("2012"))]),
                references: refs.iter().map(|(l, n)| (l.to_string(), n.to_string())).collect(),
                type_id: format!("http://www.wikidata.org/entity/T_{}", incident_type),
            });
        self
    }

    /// A title the API reports for `id`.
    pub fn api_title(mut self, id: &str, language: &str, name: &str) -> Self {
        self.inner
            .titles
            .entry(id.to_string())
            .or_default()
            .insert(language.to_string(), name.to_string());
        self
    }

    pub fn article(mut self, name: &str, language: &str, content: &str) -> Self {
        self.inner
            .articles
            .insert((name.to_string(), language.to_string()), content.to_string());
        self
    }

    pub fn links(mut self, name: &str, language: &str, links: &[&str]) -> Self {
        self.inner.links.insert(
            (name.to_string(), language.to_string()),
            links.iter().map(|l| l.to_string()).collect(),
        );
        self
    }

    /// Fail any title batch containing `id`.
    pub fn failing_title_batch(mut self, id: &str) -> Self {
        self.inner.failing_title_ids.insert(id.to_string());
        self
    }

    /// Time out link lookups for `name`.
    pub fn failing_links(mut self, name: &str) -> Self {
        self.inner.failing_link_titles.insert(name.to_string());
        self
    }

    pub fn build(self) -> FakeServices {
        self.inner
    }
}

#[async_trait]
impl QueryService for FakeServices {
    async fn query(
        &self,
        type_label: &str,
        languages: &[String],
        _mapping: &PropertyMapping,
        limit: usize,
    ) -> ServiceResult<Vec<QueryRow>> {
        Ok(self
            .rows
            .get(type_label)
            .into_iter()
            .flatten()
            .map(|row| QueryRow {
                references: row
                    .references
                    .iter()
                    .filter(|(l, _)| languages.contains(l))
                    .map(|(l, n)| (l.clone(), n.clone()))
                    .collect(),
                ..row.clone()
            })
            .take(limit)
            .collect())
    }
}

#[async_trait]
impl TitleLookupService for FakeServices {
    async fn lookup_titles(&self, ids: &[String], languages: &[String]) -> ServiceResult<TitleMap> {
        self.title_batches.lock().unwrap().push(ids.len());
        if ids.iter().any(|id| self.failing_title_ids.contains(id)) {
            return Err(ServiceError::Unavailable("rate limited".into()));
        }
        Ok(ids
            .iter()
            .filter_map(|id| {
                let titles: BTreeMap<String, String> = self
                    .titles
                    .get(id)?
                    .iter()
                    .filter(|(l, _)| languages.contains(l))
                    .map(|(l, n)| (l.clone(), n.clone()))
                    .collect();
                Some((id.clone(), titles))
            })
            .collect())
    }
}

#[async_trait]
impl HydrationService for FakeServices {
    async fn hydrate(&self, name: &str, language: &str, _info: &LanguageInfo) -> ServiceResult<HydrationOutcome> {
        Ok(match self.articles.get(&(name.to_string(), language.to_string())) {
            Some(content) => HydrationOutcome::Hydrated {
                content: content.clone(),
                annotations: None,
            },
            None => HydrationOutcome::Failed {
                reason: "page not found".into(),
            },
        })
    }
}

#[async_trait]
impl LinkLookupService for FakeServices {
    async fn lookup_primary_links(&self, name: &str, language: &str) -> ServiceResult<Option<Vec<String>>> {
        self.link_lookups.lock().unwrap().push(name.to_string());
        if self.failing_link_titles.contains(name) {
            return Err(ServiceError::Timeout(Duration::from_secs(5)));
        }
        Ok(self.links.get(&(name.to_string(), language.to_string())).cloned())
    }
}
