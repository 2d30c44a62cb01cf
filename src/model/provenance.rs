//! Discovery-channel provenance for reference texts

use serde::{Deserialize, Serialize};

/// The channel through which a reference text was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Provenance {
    /// Structured knowledge-base query results
    #[serde(rename = "SPARQL")]
    Sparql,
    /// Page-title lookup through the encyclopedia API
    #[serde(rename = "API")]
    Api,
    /// External source cited by an encyclopedia article
    #[serde(rename = "Wikipedia source")]
    WikipediaSource,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sparql => "SPARQL",
            Self::Api => "API",
            Self::WikipediaSource => "Wikipedia source",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provenance {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SPARQL" => Ok(Self::Sparql),
            "API" => Ok(Self::Api),
            "Wikipedia source" => Ok(Self::WikipediaSource),
            _ => Err(format!("unknown provenance tag: {}", s)),
        }
    }
}

/// Ordered, duplicate-free set of provenance tags.
///
/// Order is first-discovery order. All combining operations return a new
/// value; a `FoundBy` is never shared between reference texts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Provenance>", into = "Vec<Provenance>")]
pub struct FoundBy(Vec<Provenance>);

impl FoundBy {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn single(provenance: Provenance) -> Self {
        Self(vec![provenance])
    }

    pub fn contains(&self, provenance: Provenance) -> bool {
        self.0.contains(&provenance)
    }

    /// This set plus `provenance`, appended if not already present.
    pub fn with(&self, provenance: Provenance) -> Self {
        let mut tags = self.0.clone();
        if !tags.contains(&provenance) {
            tags.push(provenance);
        }
        Self(tags)
    }

    /// Set union; tags of `self` come first, then unseen tags of `other`.
    pub fn union(&self, other: &FoundBy) -> Self {
        other.0.iter().fold(self.clone(), |acc, p| acc.with(*p))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Provenance> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Provenance] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Provenance>> for FoundBy {
    fn from(tags: Vec<Provenance>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<FoundBy> for Vec<Provenance> {
    fn from(found_by: FoundBy) -> Self {
        found_by.0
    }
}

impl FromIterator<Provenance> for FoundBy {
    fn from_iter<I: IntoIterator<Item = Provenance>>(iter: I) -> Self {
        iter.into_iter().fold(FoundBy::new(), |acc, p| acc.with(p))
    }
}
