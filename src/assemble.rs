//! Incident assembly from knowledge-base query rows

use crate::error::{PipelineError, PipelineResult};
use crate::model::{Incident, Provenance};
use crate::reconcile::{merge, Discovered};
use crate::services::QueryRow;
use std::collections::HashMap;

/// Incidents built from one query batch
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledBatch {
    pub incidents: Vec<Incident>,
    /// Short ids in row order, as handed to the title lookup
    pub wdt_ids: Vec<String>,
    /// Type URI reported by the query rows
    pub incident_type_uri: String,
}

/// Final path segment of a fully-qualified knowledge-base id
pub fn short_id(full_id: &str) -> &str {
    full_id.rsplit('/').next().unwrap_or(full_id)
}

/// Build one incident per query row.
///
/// Each row's per-language titles become reference texts tagged
/// [`Provenance::Sparql`]. Rows repeating an id are folded into the first
/// incident with that id. An empty batch is caller misuse and fails with
/// [`PipelineError::EmptyBatch`].
pub fn assemble_incidents(incident_type: &str, rows: &[QueryRow]) -> PipelineResult<AssembledBatch> {
    let first = rows.first().ok_or(PipelineError::EmptyBatch)?;

    let mut incidents: Vec<Incident> = Vec::with_capacity(rows.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let wdt_id = short_id(&row.id).to_string();
        let discovered = row
            .references
            .iter()
            .map(|(language, name)| Discovered::new(language, name, Provenance::Sparql));

        match positions.get(&wdt_id) {
            Some(&position) => {
                let incident = &mut incidents[position];
                let existing = std::mem::take(&mut incident.reference_texts);
                incident.reference_texts = merge(existing, discovered);
                for (key, value) in &row.extra_info {
                    incident
                        .extra_info
                        .entry(key.clone())
                        .or_insert_with(|| value.clone());
                }
            }
            None => {
                positions.insert(wdt_id.clone(), incidents.len());
                let incident = Incident::new(incident_type, wdt_id)
                    .with_extra_info(row.extra_info.clone())
                    .with_reference_texts(merge(Vec::new(), discovered));
                incidents.push(incident);
            }
        }
    }

    if let Some(other) = rows.iter().find(|r| r.type_id != first.type_id) {
        tracing::warn!(
            expected = %first.type_id,
            found = %other.type_id,
            "query rows disagree on the incident type URI"
        );
    }

    let wdt_ids = incidents.iter().map(|i| i.wdt_id.clone()).collect();
    Ok(AssembledBatch {
        incidents,
        wdt_ids,
        incident_type_uri: first.type_id.clone(),
    })
}
