//! Core data structures: incidents, reference texts, and collections

mod collection;
mod incident;
mod provenance;
mod reference_text;
mod triples;


pub use collection::{output_stem, IncidentCollection, PILOT_TAG};
pub use incident::{ExtraInfo, Incident};
pub use provenance::{FoundBy, Provenance};
pub use reference_text::ReferenceText;
pub use triples::{write_triples, Triple, TripleObject, CORPUS_NS, ENTITY_NS};
