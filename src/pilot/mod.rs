//! Pilot selection: a reproducible subset of a collection for costly enrichment
//!
//! External-link resolution and NLP annotation are too expensive to run on
//! every incident. The selector draws a seeded subset instead; an empty
//! selection is a configuration or data problem and fails the unit.

mod policy;

pub use policy::SelectionPolicy;

use crate::error::{PipelineError, PipelineResult};
use crate::model::{Incident, IncidentCollection};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeSet;

/// Default seed for pilot sampling
pub const DEFAULT_SEED: u64 = 42;

/// Selects the pilot subset of a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PilotSelector {
    policy: SelectionPolicy,
    seed: u64,
    min_reference_texts: usize,
}

impl Default for PilotSelector {
    fn default() -> Self {
        Self::new(SelectionPolicy::default())
    }
}

impl PilotSelector {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            policy,
            seed: DEFAULT_SEED,
            min_reference_texts: 1,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Only incidents with at least `min` reference texts are candidates.
    pub fn with_min_reference_texts(mut self, min: usize) -> Self {
        self.min_reference_texts = min;
        self
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Select pilot incidents, returned in collection order.
    ///
    /// Fails with [`PipelineError::EmptyPilotSelection`] when nothing is selected.
    pub fn select(&self, collection: &IncidentCollection) -> PipelineResult<Vec<Incident>> {
        let candidates: Vec<usize> = collection
            .incidents
            .iter()
            .enumerate()
            .filter(|(_, incident)| incident.reference_texts.len() >= self.min_reference_texts)
            .map(|(position, _)| position)
            .collect();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let chosen: BTreeSet<usize> = match &self.policy {
            SelectionPolicy::MostReferenceTexts { limit } => {
                let mut ranked = candidates;
                ranked.shuffle(&mut rng);
                // stable sort keeps the seeded order among ties
                ranked.sort_by_key(|&p| std::cmp::Reverse(collection.incidents[p].reference_texts.len()));
                ranked.into_iter().take(*limit).collect()
            }
            SelectionPolicy::Random { limit } => {
                let mut pool = candidates;
                pool.shuffle(&mut rng);
                pool.into_iter().take(*limit).collect()
            }
            SelectionPolicy::StratifiedByLanguage { per_language } => {
                let mut chosen = BTreeSet::new();
                for language in collection.content_languages() {
                    let mut pool: Vec<usize> = candidates
                        .iter()
                        .copied()
                        .filter(|&p| collection.incidents[p].has_language(language))
                        .collect();
                    pool.shuffle(&mut rng);
                    chosen.extend(pool.into_iter().take(*per_language));
                }
                chosen
            }
        };

        if chosen.is_empty() {
            return Err(PipelineError::EmptyPilotSelection {
                incident_type: collection.incident_type.clone(),
            });
        }

        tracing::info!(
            incident_type = %collection.incident_type,
            policy = %self.policy,
            seed = self.seed,
            selected = chosen.len(),
            candidates = collection.len(),
            "pilot incidents selected"
        );

        Ok(chosen
            .into_iter()
            .map(|p| collection.incidents[p].clone())
            .collect())
    }
}
