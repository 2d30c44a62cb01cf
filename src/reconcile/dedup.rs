//! Content-based deduplication after hydration
//!
//! Name-pair merging cannot see that two titles resolve to the same article
//! (redirects, capitalization variants across channels). Once content is
//! loaded, identical bodies are collapsed here.

use crate::model::ReferenceText;
use std::collections::HashMap;

/// Remove reference texts whose `content` repeats an earlier one.
///
/// The first occurrence is kept and absorbs the `found_by` tags of every
/// removed duplicate. Records without content are never collapsed.
pub fn deduplicate(ref_texts: Vec<ReferenceText>) -> Vec<ReferenceText> {
    let mut kept: Vec<ReferenceText> = Vec::with_capacity(ref_texts.len());
    let mut by_content: HashMap<String, usize> = HashMap::new();

    for rt in ref_texts {
        if let Some(content) = &rt.content {
            if let Some(&position) = by_content.get(content.as_str()) {
                let found_by = kept[position].found_by.union(&rt.found_by);
                kept[position].found_by = found_by;
                continue;
            }
            by_content.insert(content.clone(), kept.len());
        }
        kept.push(rt);
    }
    kept
}
