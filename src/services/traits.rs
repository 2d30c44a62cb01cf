//! Capability traits for the external collaborators
//!
//! The pipeline owns no network or model code. Each capability is a narrow
//! trait; an `Err` from any of them is a per-call failure the caller decides
//! how to absorb.

use super::types::{
    FetchedArticle, HydrationOutcome, PropertyMapping, QueryRow, ServiceResult, Snapshot, TitleMap,
};
use crate::config::LanguageInfo;
use async_trait::async_trait;
use std::time::Duration;

/// Structured knowledge-base queries.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Incidents of `type_label` with article titles in `languages`, at most `limit` rows.
    async fn query(
        &self,
        type_label: &str,
        languages: &[String],
        mapping: &PropertyMapping,
        limit: usize,
    ) -> ServiceResult<Vec<QueryRow>>;
}

/// Page-title lookup for knowledge-base ids.
#[async_trait]
pub trait TitleLookupService: Send + Sync {
    /// Article titles per id and language. Ids with no titles may be absent.
    async fn lookup_titles(&self, ids: &[String], languages: &[String]) -> ServiceResult<TitleMap>;
}

/// Loads article text and annotations from the local encyclopedia snapshot.
#[async_trait]
pub trait HydrationService: Send + Sync {
    async fn hydrate(
        &self,
        name: &str,
        language: &str,
        info: &LanguageInfo,
    ) -> ServiceResult<HydrationOutcome>;
}

/// External links cited by an article.
#[async_trait]
pub trait LinkLookupService: Send + Sync {
    /// `None` when the article has no external links.
    async fn lookup_primary_links(&self, name: &str, language: &str) -> ServiceResult<Option<Vec<String>>>;
}

/// Snapshot index of a web archive.
#[async_trait]
pub trait ArchiveResolver: Send + Sync {
    /// Captures of `url`, oldest first.
    async fn snapshots(&self, url: &str) -> ServiceResult<Vec<Snapshot>>;
}

/// Fetches a page and extracts its article.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    /// `None` when the page could be fetched but held no article.
    async fn fetch(&self, url: &str, timeout: Duration) -> ServiceResult<Option<FetchedArticle>>;
}
