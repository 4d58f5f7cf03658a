use std::collections::HashMap;
use std::sync::LazyLock;

pub const OBO_PREFIX: &str = "http://purl.obolibrary.org/obo/";

// Class endpoint takes the bare code, not the URI.
pub const OMIM_ACRONYM: &str = "OMIM";

const KNOWN_PREFIXES: &[(&str, &str)] = &[
    ("EFO", "http://www.ebi.ac.uk/efo/"),
    ("TEO", "http://informatics.mayo.edu/TEO.owl#"),
    ("HIVO0004", "http://bioportal/bioontology.org/ontologies/HIVO0004#"),
    (
        "BP-METADATA",
        "http://protege.stanford.edu/ontologies/metadata/BioPortalMetadata.owl#",
    ),
    ("PEO", "http://knoesis.wright.edu/ParasiteExperiment.owl#"),
    ("CCON", "http://cerrado.linkeddata.es/ecology/ccon#"),
    ("IDODEN", "http://purl.bioontology.org/ontology/"),
    ("BRIDG", "http://www.bridgmodel.org/owl#"),
    ("ICD11-BODYSYSTEM", "http://who.int/bodysystem.owl#"),
    ("AERO", OBO_PREFIX),
    ("ONLIRA", "http://vavlab.ee.boun.edu.tr/carera/onlira.owl#"),
    ("OGI", "http://purl.obolibrary.org/obo/OGI.owl#"),
    ("PROVO", "http://www.w3.org/ns/prov#"),
    ("NEOMARK3", "http://www.neomark.eu/ontologies/neomark.owl#"),
    ("NEOMARK4", "http://neomark.owl#"),
    ("MIXS", "http://gensc.org/ns/mixs/"),
    (
        "CTONT",
        "http://epoch.stanford.edu/ClinicalTrialOntology.owl#OperationalPlan",
    ),
    ("BAO", "http://www.bioassayontology.org/bao#"),
    ("SIO", "http://semanticscience.org/resource/"),
    ("NCBITAXON", "http://purl.bioontology.org/ontology/NCBITAXON/"),
    ("UO", OBO_PREFIX),
    ("UBERON", OBO_PREFIX),
    ("MA", OBO_PREFIX),
    ("IAO", OBO_PREFIX),
    ("OBI", OBO_PREFIX),
    ("BFO", OBO_PREFIX),
    ("GO", OBO_PREFIX),
    ("HP", OBO_PREFIX),
    ("PO", OBO_PREFIX),
    ("BTO", OBO_PREFIX),
    ("CL", OBO_PREFIX),
    ("CLO", OBO_PREFIX),
    ("NCBITaxon", OBO_PREFIX),
    ("IDO", OBO_PREFIX),
    ("CHEBI", OBO_PREFIX),
    ("ORDO", "http://www.orpha.net/ORDO/"),
    (OMIM_ACRONYM, "http://omim.org/entry/"),
    ("MESH", "http://purl.bioontology.org/ontology/MESH/"),
    ("LNC", "http://purl.bioontology.org/ontology/LNC/"),
];

static BY_ACRONYM: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| KNOWN_PREFIXES.iter().copied().collect());

static BY_PREFIX: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    KNOWN_PREFIXES
        .iter()
        .map(|&(acronym, prefix)| (reverse_key(acronym, prefix), acronym))
        .collect()
});

// OBO entries share one base URI, so they are keyed by `base + acronym + "_"`.
fn reverse_key(acronym: &str, prefix: &str) -> String {
    if prefix == OBO_PREFIX {
        format!("{OBO_PREFIX}{acronym}_")
    } else {
        prefix.to_string()
    }
}

pub fn prefix_for(acronym: &str) -> Option<&'static str> {
    BY_ACRONYM.get(acronym).copied()
}

pub fn acronym_for_prefix(uri_prefix: &str) -> Option<&'static str> {
    BY_PREFIX.get(uri_prefix).copied()
}

pub fn known_prefixes() -> &'static [(&'static str, &'static str)] {
    KNOWN_PREFIXES
}
