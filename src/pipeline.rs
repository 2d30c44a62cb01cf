//! Pipeline orchestration
//!
//! One *unit* is an (incident type, language set) pair. Per unit:
//! query → assemble → title merge → hydrate → persist collection →
//! select pilot → resolve links → crawl primary texts → persist pilot →
//! annotate pilot. A unit failure is reported and the next unit runs.

use crate::annotate::{annotate_collection, AnnotationReport, ModelRegistry};
use crate::assemble::assemble_incidents;
use crate::config::PipelineConfig;
use crate::crawl::{CrawlReport, PrimaryTextCrawler};
use crate::error::{PipelineError, PipelineResult};
use crate::hydrate::{hydrate_incidents, HydrationReport};
use crate::links::{LinkReport, LinkResolver};
use crate::model::{write_triples, Incident, IncidentCollection, Provenance};
use crate::reconcile::{deduplicate, merge_records, merge_titles};
use crate::services::{
    ArchiveResolver, ArticleFetcher, HydrationService, LinkLookupService, PropertyMapping,
    QueryService, TitleLookupService,
};
use crate::storage::{CollectionKey, CollectionStore};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// External services a pipeline run talks to
#[derive(Clone)]
pub struct PipelineServices {
    pub query: Arc<dyn QueryService>,
    pub titles: Arc<dyn TitleLookupService>,
    pub hydration: Arc<dyn HydrationService>,
    pub links: Arc<dyn LinkLookupService>,
}

impl PipelineServices {
    /// Use one value for every capability.
    pub fn from_single<S>(service: Arc<S>) -> Self
    where
        S: QueryService + TitleLookupService + HydrationService + LinkLookupService + 'static,
    {
        Self {
            query: service.clone(),
            titles: service.clone(),
            hydration: service.clone(),
            links: service,
        }
    }
}

/// Archive and fetcher used to crawl the pilot's primary reference texts
#[derive(Clone)]
pub struct CrawlServices {
    pub archive: Arc<dyn ArchiveResolver>,
    pub fetcher: Arc<dyn ArticleFetcher>,
}

/// Wall-clock time spent per stage of a unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageTimings {
    /// Query, assembly, title merge, hydration, and persistence
    pub extraction: Duration,
    pub pilot_selection: Duration,
    /// Link resolution and primary-text crawling
    pub primary_texts: Duration,
    pub annotation: Duration,
}

impl StageTimings {
    pub fn total(&self) -> Duration {
        self.extraction + self.pilot_selection + self.primary_texts + self.annotation
    }
}

/// What a successful unit produced
#[derive(Debug, Clone, Serialize)]
pub struct UnitSummary {
    pub collection: CollectionKey,
    pub pilot: CollectionKey,
    pub incidents: usize,
    pub reference_texts: usize,
    pub pilot_incidents: usize,
    pub hydration: HydrationReport,
    pub links: LinkReport,
    pub crawl: Option<CrawlReport>,
    pub annotation: AnnotationReport,
    pub timings: StageTimings,
}

#[derive(Debug)]
pub struct UnitOutcome {
    pub incident_type: String,
    pub languages: Vec<String>,
    pub result: PipelineResult<UnitSummary>,
}

#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub units: Vec<UnitOutcome>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.units.iter().filter(|u| u.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.units.len() - self.succeeded()
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    services: PipelineServices,
    store: Arc<dyn CollectionStore>,
    models: ModelRegistry,
    crawl: Option<CrawlServices>,
}

impl Pipeline {
    /// Build a pipeline; fails with [`PipelineError::Config`] when `config` does not validate.
    pub fn new(
        config: PipelineConfig,
        services: PipelineServices,
        store: Arc<dyn CollectionStore>,
    ) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            services,
            store,
            models: ModelRegistry::new(),
            crawl: None,
        })
    }

    pub fn with_models(mut self, models: ModelRegistry) -> Self {
        self.models = models;
        self
    }

    pub fn with_crawl(mut self, crawl: CrawlServices) -> Self {
        self.crawl = Some(crawl);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every configured (incident type, language set) unit.
    pub async fn run(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let start = Instant::now();
        let mut units = Vec::new();

        for incident_type in &self.config.incident_types {
            for languages in &self.config.language_sets {
                tracing::info!(%run_id, %incident_type, languages = %languages.join(","), "starting unit");
                let result = self.run_unit(incident_type, languages).await;
                match &result {
                    Ok(summary) => tracing::info!(
                        %run_id,
                        %incident_type,
                        incidents = summary.incidents,
                        pilot_incidents = summary.pilot_incidents,
                        elapsed_ms = summary.timings.total().as_millis() as u64,
                        "unit finished"
                    ),
                    Err(e) => tracing::error!(%run_id, %incident_type, error = %e, "unit failed"),
                }
                units.push(UnitOutcome {
                    incident_type: incident_type.clone(),
                    languages: languages.clone(),
                    result,
                });
            }
        }

        RunReport {
            run_id,
            units,
            elapsed: start.elapsed(),
        }
    }

    /// Run one unit end to end.
    pub async fn run_unit(&self, incident_type: &str, languages: &[String]) -> PipelineResult<UnitSummary> {
        let mut timings = StageTimings::default();
        let started = Instant::now();

        let (incidents, incident_type_uri) = self.retrieve_incidents(incident_type, languages).await?;
        let (incidents, hydration) =
            hydrate_incidents(incidents, self.services.hydration.as_ref(), &self.config.languages).await;

        let collection =
            IncidentCollection::new(incident_type, incident_type_uri, languages.to_vec(), incidents);
        let collection_key = self.persist(&collection)?;
        timings.extraction = started.elapsed();

        let started = Instant::now();
        let mut pilots = self.config.pilot.selector().select(&collection)?;
        timings.pilot_selection = started.elapsed();

        let started = Instant::now();
        let links = LinkResolver::new(self.services.links.as_ref())
            .resolve(&mut pilots)
            .await;
        let crawl = match &self.crawl {
            Some(services) => Some(self.crawl_primary_texts(services, &mut pilots).await),
            None => None,
        };
        timings.primary_texts = started.elapsed();

        let pilot = collection.pilot_variant(pilots);
        let pilot_key = self.persist(&pilot)?;

        let started = Instant::now();
        let annotation = annotate_collection(&pilot, &self.models, &self.config.languages);
        timings.annotation = started.elapsed();

        Ok(UnitSummary {
            collection: collection_key,
            pilot: pilot_key,
            incidents: collection.len(),
            reference_texts: collection.reference_text_count(),
            pilot_incidents: pilot.len(),
            hydration,
            links,
            crawl,
            annotation,
            timings,
        })
    }

    /// Query the knowledge base, assemble incidents, and merge in API titles.
    async fn retrieve_incidents(
        &self,
        incident_type: &str,
        languages: &[String],
    ) -> PipelineResult<(Vec<Incident>, String)> {
        let mapping = self.load_mapping(incident_type)?;
        let rows = self
            .services
            .query
            .query(incident_type, languages, &mapping, self.config.query_limit)
            .await?;
        let batch = assemble_incidents(incident_type, &rows)?;
        tracing::info!(%incident_type, incidents = batch.incidents.len(), "incidents assembled from query results");

        let mut incidents = batch.incidents;
        for ids in batch.wdt_ids.chunks(self.config.title_batch_size) {
            match self.services.titles.lookup_titles(ids, languages).await {
                Ok(titles) => incidents = merge_titles(incidents, &titles, Provenance::Api),
                Err(e) => tracing::warn!(
                    %incident_type,
                    batch_size = ids.len(),
                    error = %e,
                    "title lookup failed for batch"
                ),
            }
        }
        Ok((incidents, batch.incident_type_uri))
    }

    fn load_mapping(&self, incident_type: &str) -> PipelineResult<PropertyMapping> {
        let path = self.config.mappings.path_for(incident_type);
        let raw = std::fs::read_to_string(&path)?;
        serde_json::from_str(&raw).map_err(|source| PipelineError::Mapping { path, source })
    }

    /// Crawl each pilot text's primary links and add accepted pages to its incident.
    async fn crawl_primary_texts(&self, services: &CrawlServices, pilots: &mut [Incident]) -> CrawlReport {
        let crawler = PrimaryTextCrawler::new(services.archive.as_ref(), services.fetcher.as_ref())
            .with_filter(self.config.crawl.filter.clone())
            .with_timeout(self.config.crawl.timeout());
        let mut total = CrawlReport::default();

        for incident in pilots.iter_mut() {
            let urls: Vec<String> = incident
                .reference_texts
                .iter()
                .filter_map(|rt| rt.primary_ref_texts.as_ref())
                .flatten()
                .cloned()
                .collect();
            if urls.is_empty() {
                continue;
            }
            let (crawled, report) = crawler.crawl_all(&urls).await;
            total.processed += report.processed;
            for (status, count) in report.statuses {
                *total.statuses.entry(status).or_insert(0) += count;
            }
            let existing = std::mem::take(&mut incident.reference_texts);
            incident.reference_texts = deduplicate(merge_records(existing, crawled));
        }
        total
    }

    /// Save the snapshot and write the triple file.
    fn persist(&self, collection: &IncidentCollection) -> PipelineResult<CollectionKey> {
        let key = self.store.save(collection)?;
        let path = self.write_triples_file(collection)?;
        tracing::info!(
            collection = %key,
            incidents = collection.len(),
            triples = %path.display(),
            "collection persisted"
        );
        Ok(key)
    }

    fn write_triples_file(&self, collection: &IncidentCollection) -> PipelineResult<PathBuf> {
        let dir = self.config.triples_dir();
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.nt", collection.output_stem()));
        write_triples_to(collection, &path)?;
        Ok(path)
    }
}

/// Write the triples of `collection` to `path`.
pub fn write_triples_to(collection: &IncidentCollection, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    write_triples(&collection.triples(), BufWriter::new(file))
}
