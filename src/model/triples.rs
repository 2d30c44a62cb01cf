//! Triple projection of incident collections
//!
//! Every field of a collection maps to one or more `(subject, predicate,
//! object)` triples so the graph serialization carries the same information
//! as the snapshot. [`write_triples`] emits them one per line in N-Triples form.

use super::collection::IncidentCollection;
use super::incident::Incident;
use super::reference_text::ReferenceText;
use std::io::{self, Write};

/// Entity namespace of the knowledge base
pub const ENTITY_NS: &str = "http://www.wikidata.org/entity/";
/// Vocabulary namespace for corpus predicates and local resources
pub const CORPUS_NS: &str = "http://incident-corpus.org/";

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripleObject {
    Resource(String),
    Literal {
        value: String,
        language: Option<String>,
    },
}

impl TripleObject {
    fn plain(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            language: None,
        }
    }

    /// Language-tagged literal; an empty tag yields a plain literal.
    fn tagged(value: impl Into<String>, language: &str) -> Self {
        Self::Literal {
            value: value.into(),
            language: (!language.is_empty()).then(|| language.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: TripleObject,
}

impl Triple {
    fn new(subject: impl Into<String>, predicate: &str, object: TripleObject) -> Self {
        Self {
            subject: subject.into(),
            predicate: vocab(predicate),
            object,
        }
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}> <{}> ", self.subject, self.predicate)?;
        match &self.object {
            TripleObject::Resource(iri) => write!(f, "<{}>", iri)?,
            TripleObject::Literal { value, language } => {
                write!(f, "\"{}\"", escape_literal(value))?;
                if let Some(lang) = language {
                    write!(f, "@{}", lang)?;
                }
            }
        }
        f.write_str(" .")
    }
}

fn vocab(term: &str) -> String {
    if term.starts_with("http://") || term.starts_with("https://") {
        term.to_string()
    } else {
        format!("{}vocab/{}", CORPUS_NS, term)
    }
}

/// Percent-encode characters not allowed inside an IRI reference.
fn escape_iri(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            ' ' => out.push('_'),
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => {
                out.push_str(&format!("%{:02X}", c as u32));
            }
            c if c.is_control() => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("%{:02X}", byte));
                }
            }
            c => out.push(c),
        }
    }
    out
}

fn escape_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

fn incident_iri(incident: &Incident) -> String {
    format!("{}{}", ENTITY_NS, escape_iri(&incident.wdt_id))
}

fn reference_text_iri(rt: &ReferenceText) -> String {
    match &rt.uri {
        Some(uri) => escape_iri(uri),
        None => format!(
            "{}reftext/{}/{}",
            CORPUS_NS,
            escape_iri(&rt.language),
            escape_iri(&rt.name)
        ),
    }
}

impl IncidentCollection {
    /// IRI naming this collection as a whole
    pub fn iri(&self) -> String {
        format!("{}collection/{}", CORPUS_NS, escape_iri(&self.output_stem()))
    }

    /// Project the collection into triples.
    pub fn triples(&self) -> Vec<Triple> {
        let subject = self.iri();
        let mut out = vec![
            Triple::new(&subject, RDF_TYPE, TripleObject::Resource(vocab("IncidentCollection"))),
            Triple::new(&subject, "incidentType", TripleObject::plain(&self.incident_type)),
            Triple::new(
                &subject,
                "incidentTypeUri",
                TripleObject::Resource(escape_iri(&self.incident_type_uri)),
            ),
            Triple::new(&subject, "version", TripleObject::plain(&self.version)),
            Triple::new(&subject, "createdAt", TripleObject::plain(self.created_at.to_rfc3339())),
        ];
        for language in &self.languages {
            out.push(Triple::new(&subject, "language", TripleObject::plain(language)));
        }
        for incident in &self.incidents {
            out.push(Triple::new(
                &subject,
                "hasIncident",
                TripleObject::Resource(incident_iri(incident)),
            ));
            incident_triples(incident, &self.incident_type_uri, &mut out);
        }
        out
    }
}

fn incident_triples(incident: &Incident, type_uri: &str, out: &mut Vec<Triple>) {
    let subject = incident_iri(incident);
    out.push(Triple::new(&subject, RDF_TYPE, TripleObject::Resource(escape_iri(type_uri))));
    out.push(Triple::new(&subject, "wdtId", TripleObject::plain(&incident.wdt_id)));
    out.push(Triple::new(&subject, "incidentType", TripleObject::plain(&incident.incident_type)));

    for (key, value) in &incident.extra_info {
        let object = match value {
            serde_json::Value::String(s) => TripleObject::plain(s),
            other => TripleObject::plain(other.to_string()),
        };
        out.push(Triple::new(&subject, &format!("extra/{}", escape_iri(key)), object));
    }

    for rt in &incident.reference_texts {
        let rt_subject = reference_text_iri(rt);
        out.push(Triple::new(&subject, "hasReferenceText", TripleObject::Resource(rt_subject.clone())));
        reference_text_triples(rt, &rt_subject, out);
    }
}

fn reference_text_triples(rt: &ReferenceText, subject: &str, out: &mut Vec<Triple>) {
    out.push(Triple::new(subject, RDF_TYPE, TripleObject::Resource(vocab("ReferenceText"))));
    out.push(Triple::new(subject, "name", TripleObject::tagged(&rt.name, &rt.language)));
    out.push(Triple::new(subject, "language", TripleObject::plain(&rt.language)));
    if let Some(uri) = &rt.uri {
        out.push(Triple::new(subject, "uri", TripleObject::Resource(escape_iri(uri))));
    }
    if let Some(archive) = &rt.web_archive_uri {
        out.push(Triple::new(subject, "webArchiveUri", TripleObject::Resource(escape_iri(archive))));
    }
    if let Some(content) = &rt.content {
        out.push(Triple::new(subject, "content", TripleObject::tagged(content, &rt.language)));
    }
    if let Some(date) = &rt.creation_date {
        out.push(Triple::new(subject, "creationDate", TripleObject::plain(date.to_rfc3339())));
    }
    for tag in rt.found_by.iter() {
        out.push(Triple::new(subject, "foundBy", TripleObject::plain(tag.as_str())));
    }
    if let Some(annotations) = &rt.annotations {
        out.push(Triple::new(subject, "annotations", TripleObject::plain(annotations.to_string())));
    }
    for link in rt.primary_ref_texts.iter().flatten() {
        out.push(Triple::new(subject, "primaryReferenceText", TripleObject::Resource(escape_iri(link))));
    }
}

/// Write triples one per line.
pub fn write_triples<W: Write>(triples: &[Triple], mut writer: W) -> io::Result<()> {
    for triple in triples {
        writeln!(writer, "{}", triple)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Provenance;

    fn collection() -> IncidentCollection {
        let rt = ReferenceText::new("Battle \"X\"", "en", Provenance::Sparql)
            .with_content("line one\nline two");
        let mut rt = rt.with_found_by(crate::model::FoundBy::from(vec![Provenance::Sparql, Provenance::Api]));
        rt.primary_ref_texts = Some(vec!["http://x".to_string()]);
        let incident = Incident::new("election", "Q42").with_reference_texts(vec![rt]);
        IncidentCollection::new(
            "election",
            "http://www.wikidata.org/entity/Q40231",
            vec!["en".to_string()],
            vec![incident],
        )
    }

    #[test]
    fn every_provenance_tag_becomes_a_triple() {
        let triples = collection().triples();
        let found_by: Vec<_> = triples
            .iter()
            .filter(|t| t.predicate.ends_with("/foundBy"))
            .map(|t| t.object.clone())
            .collect();
        assert_eq!(found_by, vec![TripleObject::plain("SPARQL"), TripleObject::plain("API")]);
    }

    #[test]
    fn incidents_use_entity_namespace() {
        let triples = collection().triples();
        assert!(triples
            .iter()
            .any(|t| t.subject == "http://www.wikidata.org/entity/Q42"
                && t.object == TripleObject::Resource("http://www.wikidata.org/entity/Q40231".into())));
    }

    #[test]
    fn primary_links_are_resources() {
        let triples = collection().triples();
        assert!(triples.iter().any(|t| t.predicate.ends_with("/primaryReferenceText")
            && t.object == TripleObject::Resource("http://x".into())));
    }

    #[test]
    fn literals_are_escaped_on_write() {
        let mut buf = Vec::new();
        write_triples(&collection().triples(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains(r#""line one\nline two"@en"#));
        assert!(text.contains("reftext/en/Battle_%22X%22"));
        assert!(text.lines().all(|l| l.ends_with(" .")));
    }

    #[test]
    fn empty_language_writes_plain_literals() {
        let rt = ReferenceText::new("Home", "", Provenance::WikipediaSource).with_content("body");
        let incident = Incident::new("election", "Q1").with_reference_texts(vec![rt]);
        let collection = IncidentCollection::new("election", "uri", vec!["en".to_string()], vec![incident]);

        let mut buf = Vec::new();
        write_triples(&collection.triples(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains(r#""Home" ."#));
        assert!(!text.contains("\"@"));
    }
}
