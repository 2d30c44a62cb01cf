//! Name-pair merging of reference texts discovered through several channels

use crate::model::{Incident, Provenance, ReferenceText};
use crate::services::TitleMap;
use std::collections::HashMap;

/// A reference-text candidate reported by one discovery channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    pub language: String,
    pub name: String,
    pub provenance: Provenance,
}

impl Discovered {
    pub fn new(language: impl Into<String>, name: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            language: language.into(),
            name: name.into(),
            provenance,
        }
    }
}

impl<L: Into<String>, N: Into<String>> From<(L, N, Provenance)> for Discovered {
    fn from((language, name, provenance): (L, N, Provenance)) -> Self {
        Self::new(language, name, provenance)
    }
}

/// Merge `discovered` candidates into `existing`.
///
/// A candidate whose `(name, language)` matches a record gets its provenance
/// added to that record's `found_by`; any other candidate becomes a new,
/// unhydrated record. Existing records keep their order and new ones follow
/// in discovery order. Merging the same candidates again changes nothing.
pub fn merge<I>(existing: Vec<ReferenceText>, discovered: I) -> Vec<ReferenceText>
where
    I: IntoIterator,
    I::Item: Into<Discovered>,
{
    let mut merged = existing;
    let mut index = name_pair_index(&merged);

    for candidate in discovered {
        let Discovered {
            language,
            name,
            provenance,
        } = candidate.into();
        let key = (name, language);
        match index.get(&key) {
            Some(&position) => {
                let found_by = merged[position].found_by.with(provenance);
                merged[position].found_by = found_by;
            }
            None => {
                let (name, language) = key;
                index.insert((name.clone(), language.clone()), merged.len());
                merged.push(ReferenceText::new(name, language, provenance));
            }
        }
    }
    merged
}

/// Fold fully-formed records into `existing` by `(name, language)`.
///
/// A record matching an existing one contributes only its `found_by` tags;
/// the existing record's fields win. Unmatched records are appended in order.
pub fn merge_records<I>(existing: Vec<ReferenceText>, incoming: I) -> Vec<ReferenceText>
where
    I: IntoIterator<Item = ReferenceText>,
{
    let mut merged = existing;
    let mut index = name_pair_index(&merged);

    for rt in incoming {
        let key = (rt.name.clone(), rt.language.clone());
        match index.get(&key) {
            Some(&position) => {
                let found_by = merged[position].found_by.union(&rt.found_by);
                merged[position].found_by = found_by;
            }
            None => {
                index.insert(key, merged.len());
                merged.push(rt);
            }
        }
    }
    merged
}

fn name_pair_index(records: &[ReferenceText]) -> HashMap<(String, String), usize> {
    let mut index = HashMap::new();
    for (position, rt) in records.iter().enumerate() {
        index
            .entry((rt.name.clone(), rt.language.clone()))
            .or_insert(position);
    }
    index
}

/// Merge the titles found for one incident into its reference texts.
pub fn merge_into_incident(
    mut incident: Incident,
    titles: &crate::services::TitlesByLanguage,
    provenance: Provenance,
) -> Incident {
    let existing = std::mem::take(&mut incident.reference_texts);
    incident.reference_texts = merge(
        existing,
        titles
            .iter()
            .map(|(language, name)| Discovered::new(language, name, provenance)),
    );
    incident
}

/// Merge a title-lookup response into every incident it mentions.
pub fn merge_titles(incidents: Vec<Incident>, titles: &TitleMap, provenance: Provenance) -> Vec<Incident> {
    incidents
        .into_iter()
        .map(|incident| match titles.get(&incident.wdt_id) {
            Some(found) => merge_into_incident(incident, found, provenance),
            None => incident,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FoundBy;
    use std::collections::BTreeMap;

    fn sparql(name: &str, language: &str) -> ReferenceText {
        ReferenceText::new(name, language, Provenance::Sparql)
    }

    #[test]
    fn matching_pair_gains_provenance_instead_of_duplicating() {
        let merged = merge(vec![sparql("Foo", "en")], [("en", "Foo", Provenance::Api)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].found_by.as_slice(), &[Provenance::Sparql, Provenance::Api]);
    }

    #[test]
    fn unmatched_pair_is_appended_unhydrated() {
        let merged = merge(vec![sparql("Foo", "en")], [("nl", "Foo", Provenance::Api)]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].language, "nl");
        assert_eq!(merged[1].found_by.as_slice(), &[Provenance::Api]);
        assert!(merged[1].content.is_none());
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let discovered = vec![
            Discovered::new("en", "Foo", Provenance::Api),
            Discovered::new("it", "Bar", Provenance::Api),
        ];
        let once = merge(vec![sparql("Foo", "en")], discovered.clone());
        let twice = merge(once.clone(), discovered);
        assert_eq!(once, twice);
        assert!(twice
            .iter()
            .all(|rt| rt.found_by.iter().filter(|p| **p == Provenance::Api).count() == 1));
    }

    #[test]
    fn order_is_existing_then_discovery() {
        let merged = merge(
            vec![sparql("B", "en"), sparql("A", "en")],
            [
                ("en", "D", Provenance::Api),
                ("en", "A", Provenance::Api),
                ("en", "C", Provenance::Api),
            ],
        );
        let names: Vec<_> = merged.iter().map(|rt| rt.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "D", "C"]);
    }

    #[test]
    fn repeated_candidates_collapse() {
        let merged = merge(
            Vec::new(),
            [("en", "A", Provenance::Api), ("en", "A", Provenance::Sparql)],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].found_by, FoundBy::from(vec![Provenance::Api, Provenance::Sparql]));
    }

    #[test]
    fn name_match_is_case_sensitive() {
        let merged = merge(vec![sparql("Foo", "en")], [("en", "foo", Provenance::Api)]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn api_discovery_keeps_uri_and_content() {
        let rt = sparql("A", "en")
            .with_uri("https://en.wikipedia.org/wiki/A")
            .with_content("body");
        let incident = Incident::new("election", "Q42").with_reference_texts(vec![rt.clone()]);
        let titles = TitleMap::from([(
            "Q42".to_string(),
            BTreeMap::from([("en".to_string(), "A".to_string())]),
        )]);

        let merged = merge_titles(vec![incident], &titles, Provenance::Api);
        let texts = &merged[0].reference_texts;
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].found_by.as_slice(), &[Provenance::Sparql, Provenance::Api]);
        assert_eq!(texts[0].uri, rt.uri);
        assert_eq!(texts[0].content, rt.content);
    }

    #[test]
    fn records_with_same_name_pair_combine_provenance() {
        let existing = vec![sparql("Home", "en").with_content("first")];
        let crawled = |content: &str| {
            ReferenceText::new("Home", "en", Provenance::WikipediaSource).with_content(content)
        };

        let merged = merge_records(existing, [crawled("second"), crawled("third"), sparql("Home", "nl")]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].content.as_deref(), Some("first"));
        assert_eq!(
            merged[0].found_by.as_slice(),
            &[Provenance::Sparql, Provenance::WikipediaSource]
        );
        assert_eq!(merged[1].language, "nl");
    }

    #[test]
    fn incidents_without_titles_pass_through() {
        let incident = Incident::new("election", "Q7").with_reference_texts(vec![sparql("A", "en")]);
        let merged = merge_titles(vec![incident.clone()], &TitleMap::new(), Provenance::Api);
        assert_eq!(merged, vec![incident]);
    }
}
