//! Pipeline configuration loaded from YAML
//!
//! ```yaml
//! incident_types: [election, murder]
//! language_sets: [[en], [en, nl, it]]
//! languages:
//!   en: { prefix: "https://en.wikipedia.org/wiki/", document_date: 2019-01-01 }
//! pilot:
//!   policy: { kind: most_reference_texts, limit: 50 }
//!   seed: 42
//! ```

use crate::crawl::CrawlFilter;
use crate::pilot::{PilotSelector, SelectionPolicy, DEFAULT_SEED};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Batch size accommodating the title API's rate limit
pub const DEFAULT_TITLE_BATCH_SIZE: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Per-language settings of the local encyclopedia snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    /// URI prefix of articles in this language
    pub prefix: String,
    /// Document creation date stamped on annotated output
    pub document_date: NaiveDate,
}

impl Default for LanguageInfo {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            document_date: NaiveDate::default(),
        }
    }
}

/// Language code → snapshot settings
pub type LanguageTable = BTreeMap<String, LanguageInfo>;

/// Where property-mapping files live and which one each incident type uses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub dir: PathBuf,
    /// Incident type → mapping file stem
    pub by_type: BTreeMap<String, String>,
    /// Stem used for types without an entry
    pub fallback: String,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("wdt_fn_mappings"),
            by_type: BTreeMap::from([
                ("election".to_string(), "change_of_leadership".to_string()),
                ("murder".to_string(), "killing".to_string()),
            ]),
            fallback: "any".to_string(),
        }
    }
}

impl MappingConfig {
    pub fn path_for(&self, incident_type: &str) -> PathBuf {
        let stem = self.by_type.get(incident_type).unwrap_or(&self.fallback);
        self.dir.join(format!("{}.json", stem))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    pub policy: SelectionPolicy,
    pub seed: u64,
    pub min_reference_texts: usize,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            policy: SelectionPolicy::default(),
            seed: DEFAULT_SEED,
            min_reference_texts: 1,
        }
    }
}

impl PilotConfig {
    pub fn selector(&self) -> PilotSelector {
        PilotSelector::new(self.policy.clone())
            .with_seed(self.seed)
            .with_min_reference_texts(self.min_reference_texts)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub filter: CrawlFilter,
    pub timeout_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            filter: CrawlFilter::default(),
            timeout_secs: 10,
        }
    }
}

impl CrawlConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub incident_types: Vec<String>,
    pub language_sets: Vec<Vec<String>>,
    #[serde(default = "default_query_limit")]
    pub query_limit: usize,
    #[serde(default = "default_title_batch_size")]
    pub title_batch_size: usize,
    #[serde(default)]
    pub languages: LanguageTable,
    #[serde(default)]
    pub mappings: MappingConfig,
    #[serde(default)]
    pub pilot: PilotConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    /// Root directory for triple files and annotated documents
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_query_limit() -> usize {
    99_999
}

fn default_title_batch_size() -> usize {
    DEFAULT_TITLE_BATCH_SIZE
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl PipelineConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.incident_types.is_empty() {
            return Err(ConfigError::Invalid("no incident types configured".into()));
        }
        if self.language_sets.is_empty() {
            return Err(ConfigError::Invalid("no language sets configured".into()));
        }
        if self.language_sets.iter().any(Vec::is_empty) {
            return Err(ConfigError::Invalid("empty language set".into()));
        }
        if self.title_batch_size == 0 {
            return Err(ConfigError::Invalid("title_batch_size must be positive".into()));
        }
        if self.query_limit == 0 {
            return Err(ConfigError::Invalid("query_limit must be positive".into()));
        }
        Ok(())
    }

    /// Directory for graph serializations
    pub fn triples_dir(&self) -> PathBuf {
        self.output_dir.join("rdf")
    }

    /// Directory for annotated pilot documents
    pub fn documents_dir(&self) -> PathBuf {
        self.output_dir.join("documents")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
incident_types: [election]
language_sets: [[en, nl]]
"#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = PipelineConfig::from_yaml_str(MINIMAL).unwrap();
        assert_eq!(config.title_batch_size, 50);
        assert_eq!(config.query_limit, 99_999);
        assert_eq!(config.pilot.seed, DEFAULT_SEED);
        assert_eq!(config.pilot.policy, SelectionPolicy::MostReferenceTexts { limit: 50 });
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn mapping_files_resolve_by_type() {
        let mappings = MappingConfig::default();
        assert_eq!(mappings.path_for("election"), PathBuf::from("wdt_fn_mappings/change_of_leadership.json"));
        assert_eq!(mappings.path_for("murder"), PathBuf::from("wdt_fn_mappings/killing.json"));
        assert_eq!(mappings.path_for("earthquake"), PathBuf::from("wdt_fn_mappings/any.json"));
    }

    #[test]
    fn full_config_parses() {
        let config = PipelineConfig::from_yaml_str(
            r#"
incident_types: [election, murder]
language_sets: [[en], [en, nl, it]]
title_batch_size: 25
languages:
  en: { prefix: "https://en.wikipedia.org/wiki/", document_date: 2019-01-01 }
  nl: { prefix: "https://nl.wikipedia.org/wiki/", document_date: 2019-02-01 }
pilot:
  policy: { kind: stratified_by_language, per_language: 3 }
  seed: 7
crawl:
  timeout_secs: 2
  filter:
    startswith: http
    accepted_languages: [en]
    excluded_domains: [jstor.org]
    min_chars: 100
    max_chars: 10000
output_dir: /tmp/corpus
"#,
        )
        .unwrap();
        assert_eq!(config.language_sets[1], vec!["en", "nl", "it"]);
        assert_eq!(config.languages["nl"].document_date, NaiveDate::from_ymd_opt(2019, 2, 1).unwrap());
        assert_eq!(config.pilot.selector().seed(), 7);
        assert_eq!(
            config.pilot.policy,
            SelectionPolicy::StratifiedByLanguage { per_language: 3 }
        );
        assert_eq!(config.crawl.timeout(), Duration::from_secs(2));
        assert_eq!(config.crawl.filter.min_chars, Some(100));
        assert_eq!(config.triples_dir(), PathBuf::from("/tmp/corpus/rdf"));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let raw = format!("{}title_batch_size: 0\n", MINIMAL);
        assert!(matches!(
            PipelineConfig::from_yaml_str(&raw),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn empty_language_set_is_rejected() {
        let raw = "incident_types: [election]\nlanguage_sets: [[]]\n";
        assert!(PipelineConfig::from_yaml_str(raw).is_err());
    }
}
