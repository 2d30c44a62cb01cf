//! Reconciliation of reference texts arriving from several discovery channels
//!
//! Two stages, in order: `merge` by `(name, language)` while candidates are
//! still titles, then `deduplicate` by exact content once they are hydrated.

mod dedup;
mod merger;

pub use dedup::deduplicate;
pub use merger::{merge, merge_into_incident, merge_records, merge_titles, Discovered};
