use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::Serialize;

use crate::error::OntoError;

// The service only recognises this acronym in mixed case.
pub const NCBI_TAXON_ACRONYM: &str = "NCBITaxon";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OntologyAcronym(String);

impl OntologyAcronym {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OntologyAcronym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OntologyAcronym {
    type Err = OntoError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let is_valid = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !is_valid {
            return Err(OntoError::InvalidAcronym(value.to_string()));
        }
        if trimmed == NCBI_TAXON_ACRONYM {
            return Ok(Self(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_uppercase()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    Found(V),
    NotFound,
}

impl<V> Lookup<V> {
    pub fn into_option(self) -> Option<V> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

impl<V> From<Option<V>> for Lookup<V> {
    fn from(value: Option<V>) -> Self {
        match value {
            Some(value) => Lookup::Found(value),
            None => Lookup::NotFound,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OntologyRef {
    pub acronym: OntologyAcronym,
    pub display_name: String,
    pub class_uri_prefix: Option<String>,
    pub fetched_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OntologyClassRef {
    pub iri: String,
    pub ontology_acronym: String,
    pub preferred_label: Option<String>,
    pub synonyms: BTreeSet<String>,
    pub definitions: BTreeSet<String>,
    pub obsolete: bool,
}

impl OntologyClassRef {
    pub fn new(iri: impl Into<String>, ontology_acronym: impl Into<String>) -> Self {
        Self {
            iri: iri.into(),
            ontology_acronym: ontology_acronym.into(),
            preferred_label: None,
            synonyms: BTreeSet::new(),
            definitions: BTreeSet::new(),
            obsolete: false,
        }
    }

    pub fn class_ref(&self) -> ClassRef {
        ClassRef {
            iri: self.iri.clone(),
            ontology_acronym: self.ontology_acronym.clone(),
        }
    }
}

impl PartialEq for OntologyClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.iri == other.iri
    }
}

impl Eq for OntologyClassRef {}

impl Hash for OntologyClassRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.iri.hash(state);
    }
}

impl PartialOrd for OntologyClassRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OntologyClassRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iri.cmp(&other.iri)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClassRef {
    pub iri: String,
    pub ontology_acronym: String,
}

impl ClassRef {
    pub fn new(iri: impl Into<String>, ontology_acronym: impl Into<String>) -> Self {
        Self {
            iri: iri.into(),
            ontology_acronym: ontology_acronym.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassMapping {
    pub id: String,
    pub source: String,
    pub process: String,
    pub target_class: ClassRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyEntry {
    pub class_ref: ClassRef,
    pub distance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationSpan {
    pub from: i64,
    pub to: i64,
    pub match_type: String,
    pub matched_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextAnnotation {
    pub annotated_class: ClassRef,
    pub hierarchy: Vec<HierarchyEntry>,
    pub spans: Vec<AnnotationSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedRef {
    pub class_uri: String,
    pub ontology_acronym: OntologyAcronym,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Children,
    Descendants,
    Parents,
    Ancestors,
}

impl Relation {
    pub fn path_segment(self) -> &'static str {
        match self {
            Relation::Children => "children",
            Relation::Descendants => "descendants",
            Relation::Parents => "parents",
            Relation::Ancestors => "ancestors",
        }
    }

    pub fn is_paged(self) -> bool {
        matches!(self, Relation::Children | Relation::Descendants)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}
