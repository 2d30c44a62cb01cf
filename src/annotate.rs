//! Annotation of pilot reference texts through per-language NLP models
//!
//! Models are owned by a [`ModelRegistry`] built for one pipeline run and
//! passed to the annotation stage explicitly.

use crate::config::LanguageTable;
use crate::model::IncidentCollection;
use crate::services::{ServiceError, ServiceResult};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything an annotator needs to process one reference text
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationRequest<'a> {
    pub title: &'a str,
    pub text: &'a str,
    pub uri: Option<&'a str>,
    /// Annotations carried over from hydration
    pub annotations: Option<&'a serde_json::Value>,
    pub prefix: &'a str,
    pub language: &'a str,
    /// Document creation time of the snapshot the text came from
    pub document_date: NaiveDate,
}

/// An NLP model for one language.
pub trait Annotator: Send + Sync {
    fn model_name(&self) -> &str;

    fn annotate(&self, request: &AnnotationRequest<'_>) -> ServiceResult<()>;
}

/// Loaded models keyed by language code
#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, Arc<dyn Annotator>>,
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.models.iter().map(|(lang, model)| (lang, model.model_name())))
            .finish()
    }
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, language: impl Into<String>, model: Arc<dyn Annotator>) -> Self {
        self.register(language, model);
        self
    }

    /// Register `model` for `language`, replacing any earlier one.
    pub fn register(&mut self, language: impl Into<String>, model: Arc<dyn Annotator>) {
        self.models.insert(language.into(), model);
    }

    pub fn get(&self, language: &str) -> Option<&Arc<dyn Annotator>> {
        self.models.get(language)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationReport {
    pub annotated: usize,
    pub missing_model: usize,
    pub missing_language_info: usize,
    pub missing_content: usize,
    pub failed: usize,
}

/// Annotate every hydrated reference text of `collection`.
pub fn annotate_collection(
    collection: &IncidentCollection,
    registry: &ModelRegistry,
    languages: &LanguageTable,
) -> AnnotationReport {
    let mut report = AnnotationReport::default();

    for incident in &collection.incidents {
        for rt in &incident.reference_texts {
            let Some(text) = rt.content.as_deref() else {
                report.missing_content += 1;
                continue;
            };
            let Some(info) = languages.get(&rt.language) else {
                report.missing_language_info += 1;
                continue;
            };
            let Some(model) = registry.get(&rt.language) else {
                report.missing_model += 1;
                continue;
            };

            let request = AnnotationRequest {
                title: &rt.name,
                text,
                uri: rt.uri.as_deref(),
                annotations: rt.annotations.as_ref(),
                prefix: &info.prefix,
                language: &rt.language,
                document_date: info.document_date,
            };
            match model.annotate(&request) {
                Ok(()) => report.annotated += 1,
                Err(e) => {
                    tracing::warn!(
                        wdt_id = %incident.wdt_id,
                        name = %rt.name,
                        model = model.model_name(),
                        error = %e,
                        "annotation failed"
                    );
                    report.failed += 1;
                }
            }
        }
    }

    tracing::info!(
        incident_type = %collection.incident_type,
        annotated = report.annotated,
        failed = report.failed,
        missing_model = report.missing_model,
        "pilot annotation finished"
    );
    report
}

/// Writes each annotation request as a JSON document under `dir/<language>/`.
///
/// Stands in for a full NLP model: the written documents carry the text and
/// the hydration annotations for downstream tooling.
#[derive(Debug, Clone)]
pub struct JsonDocumentWriter {
    dir: PathBuf,
}

impl JsonDocumentWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_name(title: &str) -> String {
        let stem: String = title
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!("{}.json", stem)
    }
}

impl Annotator for JsonDocumentWriter {
    fn model_name(&self) -> &str {
        "json-document-writer"
    }

    fn annotate(&self, request: &AnnotationRequest<'_>) -> ServiceResult<()> {
        let dir = self.dir.join(request.language);
        std::fs::create_dir_all(&dir).map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        let body = serde_json::to_string_pretty(request)
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
        std::fs::write(dir.join(Self::file_name(request.title)), body)
            .map_err(|e| ServiceError::Unavailable(e.to_string()))
    }
}
