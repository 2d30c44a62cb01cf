//! Primary reference-text crawling
//!
//! Encyclopedia articles cite external sources. Each cited URL is validated,
//! resolved to a web-archive snapshot, fetched, and checked against the
//! configured filter. Accepted pages become reference texts found by
//! [`Provenance::WikipediaSource`].

use crate::model::{FoundBy, Provenance, ReferenceText};
use crate::services::{ArchiveResolver, ArticleFetcher, FetchedArticle, ServiceError, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::time::Duration;

const ARCHIVE_MARKER: &str = "web.archive.org/web/";

/// Acceptance rules for crawled pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlFilter {
    /// Required URL prefix, e.g. `http`
    pub startswith: Option<String>,
    /// Accepted ISO-639-1 codes; empty accepts all
    pub accepted_languages: BTreeSet<String>,
    /// URLs containing any of these are skipped
    pub excluded_domains: BTreeSet<String>,
    /// Pages without a title are rejected; otherwise the URL stands in as the name
    pub title_required: bool,
    pub min_chars: Option<usize>,
    pub max_chars: Option<usize>,
}

impl Default for CrawlFilter {
    fn default() -> Self {
        Self {
            startswith: None,
            accepted_languages: BTreeSet::new(),
            excluded_domains: BTreeSet::new(),
            title_required: true,
            min_chars: None,
            max_chars: None,
        }
    }
}

impl CrawlFilter {
    fn check_url(&self, url: &str) -> Result<(), CrawlStatus> {
        if self.excluded_domains.iter().any(|d| url.contains(d.as_str())) {
            return Err(CrawlStatus::ExcludedDomain);
        }
        if let Some(prefix) = &self.startswith {
            if !url.starts_with(prefix.as_str()) {
                return Err(CrawlStatus::InvalidUrl);
            }
        }
        Ok(())
    }

    fn check_article(&self, article: &FetchedArticle, text: &str) -> Result<(), CrawlStatus> {
        if self.title_required && title_of(article).is_none() {
            return Err(CrawlStatus::NoTitle);
        }
        let chars = text.chars().count();
        if self.min_chars.is_some_and(|min| chars < min) || self.max_chars.is_some_and(|max| chars > max) {
            return Err(CrawlStatus::OutsideCharRange);
        }
        if !self.accepted_languages.is_empty() {
            let accepted = article
                .language
                .as_ref()
                .is_some_and(|l| self.accepted_languages.contains(l));
            if !accepted {
                return Err(CrawlStatus::LanguageNotAccepted);
            }
        }
        Ok(())
    }
}

/// Why a URL did or did not become a reference text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStatus {
    Success,
    InvalidUrl,
    ExcludedDomain,
    SnapshotNotFound,
    ArchiveError,
    CrawlError,
    UrlError,
    LanguageNotAccepted,
    OutsideCharRange,
    NoTitle,
    NoLanguage,
}

impl std::fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::InvalidUrl => "not a valid url",
            Self::ExcludedDomain => "excluded domain",
            Self::SnapshotNotFound => "archive snapshot not found",
            Self::ArchiveError => "archive lookup failed",
            Self::CrawlError => "crawl error",
            Self::UrlError => "URL error",
            Self::LanguageNotAccepted => "not in accepted languages",
            Self::OutsideCharRange => "outside of accepted number of characters range",
            Self::NoTitle => "no title",
            Self::NoLanguage => "no language detected",
        };
        f.write_str(label)
    }
}

/// Result of crawling one URL
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlOutcome {
    Crawled(Box<ReferenceText>),
    Rejected(CrawlStatus),
}

impl CrawlOutcome {
    pub fn status(&self) -> CrawlStatus {
        match self {
            Self::Crawled(_) => CrawlStatus::Success,
            Self::Rejected(status) => *status,
        }
    }
}

/// Status counts over a batch of URLs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    pub processed: usize,
    pub statuses: BTreeMap<CrawlStatus, usize>,
}

impl CrawlReport {
    pub fn count(&self, status: CrawlStatus) -> usize {
        self.statuses.get(&status).copied().unwrap_or(0)
    }
}

/// Non-empty title of a fetched page
fn title_of(article: &FetchedArticle) -> Option<&str> {
    article.title.as_deref().filter(|t| !t.is_empty())
}

/// Latest capture that was served with HTTP 200; revisit rows are skipped.
pub fn latest_ok_snapshot(snapshots: &[Snapshot]) -> Option<&Snapshot> {
    snapshots.iter().rev().find(|s| s.status_code == Some(200))
}

pub struct PrimaryTextCrawler<'a> {
    archive: &'a dyn ArchiveResolver,
    fetcher: &'a dyn ArticleFetcher,
    filter: CrawlFilter,
    timeout: Duration,
}

impl<'a> PrimaryTextCrawler<'a> {
    pub fn new(archive: &'a dyn ArchiveResolver, fetcher: &'a dyn ArticleFetcher) -> Self {
        Self {
            archive,
            fetcher,
            filter: CrawlFilter::default(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_filter(mut self, filter: CrawlFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve `url` to an archive URL, keeping URLs that already point into the archive.
    async fn archive_url(&self, url: &str) -> Result<String, CrawlStatus> {
        if url.contains(ARCHIVE_MARKER) {
            return Ok(url.to_string());
        }
        let snapshots = self.archive.snapshots(url).await.map_err(|e| {
            tracing::debug!(url, error = %e, "archive lookup failed");
            CrawlStatus::ArchiveError
        })?;
        latest_ok_snapshot(&snapshots)
            .map(Snapshot::archive_url)
            .ok_or(CrawlStatus::SnapshotNotFound)
    }

    pub async fn crawl(&self, url: &str) -> CrawlOutcome {
        match self.try_crawl(url).await {
            Ok(rt) => CrawlOutcome::Crawled(Box::new(rt)),
            Err(status) => CrawlOutcome::Rejected(status),
        }
    }

    async fn try_crawl(&self, url: &str) -> Result<ReferenceText, CrawlStatus> {
        self.filter.check_url(url)?;
        let archive_url = self.archive_url(url).await?;

        let article = match self.fetcher.fetch(&archive_url, self.timeout).await {
            Ok(Some(article)) => article,
            Ok(None) => return Err(CrawlStatus::CrawlError),
            Err(ServiceError::Timeout(_) | ServiceError::Unavailable(_) | ServiceError::NotFound(_)) => {
                return Err(CrawlStatus::UrlError)
            }
            Err(ServiceError::InvalidResponse(_)) => return Err(CrawlStatus::CrawlError),
        };
        let text = article.text.clone().ok_or(CrawlStatus::CrawlError)?;
        self.filter.check_article(&article, &text)?;
        let language = article
            .language
            .as_deref()
            .filter(|l| !l.is_empty())
            .ok_or(CrawlStatus::NoLanguage)?;
        let name = title_of(&article).unwrap_or(url);

        Ok(ReferenceText {
            uri: Some(url.to_string()),
            web_archive_uri: Some(article.url.clone()),
            name: name.to_string(),
            language: language.to_string(),
            content: Some(text),
            creation_date: article.date_publish,
            found_by: FoundBy::single(Provenance::WikipediaSource),
            annotations: None,
            primary_ref_texts: None,
        })
    }

    /// Crawl each distinct URL once; accepted texts come back in URL order.
    pub async fn crawl_all(&self, urls: &[String]) -> (Vec<ReferenceText>, CrawlReport) {
        let mut texts = Vec::new();
        let mut report = CrawlReport::default();
        let mut seen = HashSet::new();

        for url in urls.iter().filter(|u| seen.insert(u.as_str())) {
            let outcome = self.crawl(url).await;
            report.processed += 1;
            *report.statuses.entry(outcome.status()).or_insert(0) += 1;
            match outcome {
                CrawlOutcome::Crawled(rt) => {
                    texts.push(*rt);
                }
                CrawlOutcome::Rejected(status) => {
                    tracing::debug!(url = %url, status = %status, "primary reference text rejected");
                }
            }
        }

        tracing::info!(
            processed = report.processed,
            crawled = texts.len(),
            "primary reference texts crawled"
        );
        (texts, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceResult;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct Archive(HashMap<String, Vec<Snapshot>>);

    #[async_trait]
    impl ArchiveResolver for Archive {
        async fn snapshots(&self, url: &str) -> ServiceResult<Vec<Snapshot>> {
            Ok(self.0.get(url).cloned().unwrap_or_default())
        }
    }

    struct Fetcher(HashMap<String, FetchedArticle>);

    #[async_trait]
    impl ArticleFetcher for Fetcher {
        async fn fetch(&self, url: &str, timeout: Duration) -> ServiceResult<Option<FetchedArticle>> {
            if url.contains("slow") {
                return Err(ServiceError::Timeout(timeout));
            }
            Ok(self.0.get(url).cloned())
        }
    }

    fn snapshot(timestamp: &str, original: &str, status: Option<u16>) -> Snapshot {
        Snapshot {
            timestamp: timestamp.into(),
            original: original.into(),
            status_code: status,
        }
    }

    fn article(url: &str, title: Option<&str>, text: &str, language: &str) -> FetchedArticle {
        FetchedArticle {
            url: url.into(),
            title: title.map(String::from),
            text: Some(text.into()),
            language: Some(language.into()),
            date_publish: None,
        }
    }

    const NEWS: &str = "https://news.example/story";
    const NEWS_ARCHIVED: &str = "http://web.archive.org/web/20150102/https://news.example/story";

    fn fixtures() -> (Archive, Fetcher) {
        let archive = Archive(HashMap::from([(
            NEWS.to_string(),
            vec![
                snapshot("20140101", NEWS, Some(404)),
                snapshot("20150102", NEWS, Some(200)),
                snapshot("20160101", NEWS, None),
            ],
        )]));
        let fetcher = Fetcher(HashMap::from([(
            NEWS_ARCHIVED.to_string(),
            article(NEWS_ARCHIVED, Some("Story"), "a long enough body", "en"),
        )]));
        (archive, fetcher)
    }

    #[test]
    fn latest_ok_snapshot_skips_revisits_and_errors() {
        let snapshots = vec![
            snapshot("1", "u", Some(200)),
            snapshot("2", "u", Some(200)),
            snapshot("3", "u", None),
            snapshot("4", "u", Some(302)),
        ];
        assert_eq!(latest_ok_snapshot(&snapshots).unwrap().timestamp, "2");
        assert!(latest_ok_snapshot(&[]).is_none());
    }

    #[tokio::test]
    async fn accepted_page_becomes_wikipedia_source_text() {
        let (archive, fetcher) = fixtures();
        let crawler = PrimaryTextCrawler::new(&archive, &fetcher);
        let CrawlOutcome::Crawled(rt) = crawler.crawl(NEWS).await else {
            panic!("expected a crawled text");
        };
        assert_eq!(rt.uri.as_deref(), Some(NEWS));
        assert_eq!(rt.web_archive_uri.as_deref(), Some(NEWS_ARCHIVED));
        assert_eq!(rt.name, "Story");
        assert_eq!(rt.found_by.as_slice(), &[Provenance::WikipediaSource]);
    }

    #[tokio::test]
    async fn url_filters_apply_before_any_lookup() {
        let (archive, fetcher) = fixtures();
        let crawler = PrimaryTextCrawler::new(&archive, &fetcher).with_filter(CrawlFilter {
            startswith: Some("http".into()),
            excluded_domains: BTreeSet::from(["jstor.org".to_string()]),
            ..Default::default()
        });
        assert_eq!(crawler.crawl("ftp://x").await.status(), CrawlStatus::InvalidUrl);
        assert_eq!(
            crawler.crawl("https://www.jstor.org/stable/1").await.status(),
            CrawlStatus::ExcludedDomain
        );
    }

    #[tokio::test]
    async fn missing_snapshot_is_reported() {
        let (archive, fetcher) = fixtures();
        let crawler = PrimaryTextCrawler::new(&archive, &fetcher);
        assert_eq!(
            crawler.crawl("https://unknown.example").await.status(),
            CrawlStatus::SnapshotNotFound
        );
    }

    #[tokio::test]
    async fn archive_urls_are_fetched_directly() {
        let (archive, fetcher) = fixtures();
        let crawler = PrimaryTextCrawler::new(&archive, &fetcher);
        assert_eq!(crawler.crawl(NEWS_ARCHIVED).await.status(), CrawlStatus::Success);
        assert_eq!(
            crawler.crawl("http://web.archive.org/web/1/slow").await.status(),
            CrawlStatus::UrlError
        );
    }

    #[tokio::test]
    async fn article_filters_reject_pages() {
        let (archive, fetcher) = fixtures();
        let strict = |filter: CrawlFilter| -> PrimaryTextCrawler<'_> {
            PrimaryTextCrawler::new(&archive, &fetcher).with_filter(filter)
        };

        let languages = strict(CrawlFilter {
            accepted_languages: BTreeSet::from(["nl".to_string()]),
            ..Default::default()
        });
        assert_eq!(languages.crawl(NEWS).await.status(), CrawlStatus::LanguageNotAccepted);

        let chars = strict(CrawlFilter {
            min_chars: Some(100),
            ..Default::default()
        });
        assert_eq!(chars.crawl(NEWS).await.status(), CrawlStatus::OutsideCharRange);
    }

    const UNTITLED: &str = "http://web.archive.org/web/1/https://a.example/untitled";
    const NO_LANGUAGE: &str = "http://web.archive.org/web/1/https://a.example/nolang";

    fn keyless_pages() -> Fetcher {
        let mut untitled = article(UNTITLED, None, "body without a title", "en");
        untitled.title = Some(String::new());
        let mut no_language = article(NO_LANGUAGE, Some("Home"), "body without a language", "en");
        no_language.language = None;
        Fetcher(HashMap::from([
            (UNTITLED.to_string(), untitled),
            (NO_LANGUAGE.to_string(), no_language),
        ]))
    }

    #[tokio::test]
    async fn untitled_pages_are_rejected_by_default() {
        let (archive, _) = fixtures();
        let fetcher = keyless_pages();
        let crawler = PrimaryTextCrawler::new(&archive, &fetcher);
        assert_eq!(crawler.crawl(UNTITLED).await.status(), CrawlStatus::NoTitle);
    }

    #[tokio::test]
    async fn untitled_pages_take_their_url_when_titles_are_optional() {
        let (archive, _) = fixtures();
        let fetcher = keyless_pages();
        let crawler = PrimaryTextCrawler::new(&archive, &fetcher).with_filter(CrawlFilter {
            title_required: false,
            ..Default::default()
        });
        let CrawlOutcome::Crawled(rt) = crawler.crawl(UNTITLED).await else {
            panic!("expected a crawled text");
        };
        assert_eq!(rt.name, UNTITLED);
        assert_eq!(rt.language, "en");
    }

    #[tokio::test]
    async fn pages_without_language_are_rejected() {
        let (archive, _) = fixtures();
        let fetcher = keyless_pages();
        let crawler = PrimaryTextCrawler::new(&archive, &fetcher).with_filter(CrawlFilter {
            title_required: false,
            ..Default::default()
        });
        assert_eq!(crawler.crawl(NO_LANGUAGE).await.status(), CrawlStatus::NoLanguage);
    }

    #[tokio::test]
    async fn crawl_all_visits_each_url_once_in_order() {
        let (archive, fetcher) = fixtures();
        let crawler = PrimaryTextCrawler::new(&archive, &fetcher);
        let urls = vec![
            NEWS.to_string(),
            "https://unknown.example".to_string(),
            NEWS.to_string(),
            NEWS_ARCHIVED.to_string(),
        ];
        let (texts, report) = crawler.crawl_all(&urls).await;
        assert_eq!(report.processed, 3);
        let uris: Vec<_> = texts.iter().map(|rt| rt.uri.as_deref().unwrap()).collect();
        assert_eq!(uris, vec![NEWS, NEWS_ARCHIVED]);
    }

    #[tokio::test]
    async fn crawl_all_counts_statuses() {
        let (archive, fetcher) = fixtures();
        let crawler = PrimaryTextCrawler::new(&archive, &fetcher);
        let urls = vec![NEWS.to_string(), "https://unknown.example".to_string()];
        let (texts, report) = crawler.crawl_all(&urls).await;
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].uri.as_deref(), Some(NEWS));
        assert_eq!(report.processed, 2);
        assert_eq!(report.count(CrawlStatus::Success), 1);
        assert_eq!(report.count(CrawlStatus::SnapshotNotFound), 1);
    }
}
