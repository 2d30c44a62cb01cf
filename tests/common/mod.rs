//! Shared fixtures for pipeline integration tests
//!
//! Service fakes answer from in-memory tables and can be told to fail for
//! particular titles or id batches.

#![allow(dead_code)]

pub mod fakes;

pub use fakes::{FakeServices, FakeServicesBuilder};

use incident_corpus::PipelineConfig;
use std::path::Path;

/// Write an empty property mapping for each stem under `dir/mappings/`.
pub fn write_mappings(dir: &Path, stems: &[&str]) {
    let mappings = dir.join("mappings");
    std::fs::create_dir_all(&mappings).unwrap();
    for stem in stems {
        std::fs::write(mappings.join(format!("{}.json", stem)), r#"{"P17": "sem:hasPlace"}"#).unwrap();
    }
}

/// Configuration rooted in `dir`, with mapping files already written.
pub fn config(dir: &Path, yaml_body: &str) -> PipelineConfig {
    write_mappings(dir, &["change_of_leadership", "killing", "any"]);
    let yaml = format!(
        "{}\nmappings:\n  dir: {}\noutput_dir: {}\nlanguages:\n  en: {{ prefix: \"https://en.wikipedia.org/wiki/\", document_date: 2019-01-01 }}\n  nl: {{ prefix: \"https://nl.wikipedia.org/wiki/\", document_date: 2019-01-01 }}\n",
        yaml_body,
        dir.join("mappings").display(),
        dir.join("out").display(),
    );
    PipelineConfig::from_yaml_str(&yaml).unwrap()
}
