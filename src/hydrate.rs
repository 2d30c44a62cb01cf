//! Hydration: loading article text and annotations for reference texts
//!
//! A reference text that fails to hydrate is dropped from its incident; an
//! incident left with no reference texts is dropped from the run. Both are
//! counted, never fatal.

use crate::config::LanguageTable;
use crate::model::Incident;
use crate::reconcile::deduplicate;
use crate::services::{HydrationOutcome, HydrationService};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counters for one hydration pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HydrationReport {
    pub hydrated: usize,
    pub failed: usize,
    /// Hydrated texts collapsed into an earlier text with the same content
    pub duplicates_removed: usize,
    pub incidents_kept: usize,
    pub incidents_dropped: usize,
    /// Failure reason → occurrences
    pub failure_reasons: BTreeMap<String, usize>,
}

impl HydrationReport {
    fn record_failure(&mut self, reason: impl Into<String>) {
        self.failed += 1;
        *self.failure_reasons.entry(reason.into()).or_insert(0) += 1;
    }
}

/// Hydrate every reference text, deduplicate by content, and drop emptied incidents.
pub async fn hydrate_incidents(
    incidents: Vec<Incident>,
    service: &dyn HydrationService,
    languages: &LanguageTable,
) -> (Vec<Incident>, HydrationReport) {
    let mut report = HydrationReport::default();
    let mut kept = Vec::with_capacity(incidents.len());

    for mut incident in incidents {
        let mut hydrated = Vec::with_capacity(incident.reference_texts.len());

        for mut rt in std::mem::take(&mut incident.reference_texts) {
            let Some(info) = languages.get(&rt.language) else {
                report.record_failure(format!("no snapshot settings for language {}", rt.language));
                continue;
            };
            match service.hydrate(&rt.name, &rt.language, info).await {
                Ok(HydrationOutcome::Hydrated { content, annotations }) => {
                    rt.content = Some(content);
                    rt.annotations = annotations;
                    report.hydrated += 1;
                    hydrated.push(rt);
                }
                Ok(HydrationOutcome::Failed { reason }) => {
                    tracing::debug!(name = %rt.name, language = %rt.language, %reason, "hydration failed");
                    report.record_failure(reason);
                }
                Err(e) => {
                    tracing::warn!(name = %rt.name, language = %rt.language, error = %e, "hydration service error");
                    report.record_failure(e.to_string());
                }
            }
        }

        if hydrated.is_empty() {
            report.incidents_dropped += 1;
            continue;
        }
        let before = hydrated.len();
        incident.reference_texts = deduplicate(hydrated);
        report.duplicates_removed += before - incident.reference_texts.len();
        report.incidents_kept += 1;
        kept.push(incident);
    }

    tracing::info!(
        hydrated = report.hydrated,
        failed = report.failed,
        duplicates_removed = report.duplicates_removed,
        incidents_kept = report.incidents_kept,
        incidents_dropped = report.incidents_dropped,
        "reference texts hydrated"
    );
    (kept, report)
}
