//! Attaches primary-reference links to pilot reference texts

use crate::model::{Incident, ReferenceText};
use crate::services::LinkLookupService;
use serde::Serialize;

/// What happened to one reference text's lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Links found and attached
    Attached(usize),
    /// Lookup succeeded but found nothing; the text is unchanged
    NoLinks,
    /// Lookup failed; the text is unchanged
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub lookups: usize,
    pub attached: usize,
    pub links: usize,
    pub empty: usize,
    pub failed: usize,
}

impl LinkReport {
    fn record(&mut self, outcome: LinkOutcome) {
        self.lookups += 1;
        match outcome {
            LinkOutcome::Attached(n) => {
                self.attached += 1;
                self.links += n;
            }
            LinkOutcome::NoLinks => self.empty += 1,
            LinkOutcome::Failed => self.failed += 1,
        }
    }
}

pub struct LinkResolver<'a> {
    service: &'a dyn LinkLookupService,
}

impl<'a> LinkResolver<'a> {
    pub fn new(service: &'a dyn LinkLookupService) -> Self {
        Self { service }
    }

    /// Look up links for one reference text.
    ///
    /// `primary_ref_texts` is only written when the lookup returns at least
    /// one link; otherwise it keeps whatever it held before.
    pub async fn resolve_reference_text(&self, rt: &mut ReferenceText) -> LinkOutcome {
        match self.service.lookup_primary_links(&rt.name, &rt.language).await {
            Ok(Some(links)) if !links.is_empty() => {
                let n = links.len();
                rt.primary_ref_texts = Some(links);
                LinkOutcome::Attached(n)
            }
            Ok(_) => LinkOutcome::NoLinks,
            Err(e) => {
                tracing::warn!(name = %rt.name, language = %rt.language, error = %e, "primary link lookup failed");
                LinkOutcome::Failed
            }
        }
    }

    /// Resolve links for every reference text of every incident.
    pub async fn resolve(&self, incidents: &mut [Incident]) -> LinkReport {
        let mut report = LinkReport::default();
        for incident in incidents.iter_mut() {
            for rt in incident.reference_texts.iter_mut() {
                let outcome = self.resolve_reference_text(rt).await;
                report.record(outcome);
            }
        }
        tracing::info!(
            lookups = report.lookups,
            attached = report.attached,
            failed = report.failed,
            "primary reference links resolved"
        );
        report
    }
}
