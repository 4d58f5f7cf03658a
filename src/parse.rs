use std::collections::BTreeSet;

use serde_json::Value;

use crate::domain::{
    AnnotationSpan, ClassMapping, ClassRef, HierarchyEntry, OntologyClassRef, TextAnnotation,
};
use crate::error::OntoError;

pub fn parse_ontology_class(
    ontology_acronym: &str,
    raw: &Value,
    path: &str,
) -> Result<OntologyClassRef, OntoError> {
    let iri = required_str(raw, "@id", path)?;
    let preferred_label = raw
        .get("prefLabel")
        .and_then(|v| v.as_str())
        .map(|v| v.to_string());
    let obsolete = raw
        .get("obsolete")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    Ok(OntologyClassRef {
        iri,
        ontology_acronym: ontology_acronym.to_string(),
        preferred_label,
        synonyms: string_set(raw.get("synonym")),
        definitions: string_set(raw.get("definition")),
        obsolete,
    })
}

pub fn ontology_name(acronym: &str, raw: &Value) -> String {
    raw.get("name")
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .unwrap_or_else(|| acronym.to_string())
}

pub fn first_class_iri(raw: &Value) -> Option<String> {
    raw.get("collection")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|v| v.get("@id"))
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

pub fn prefix_from_class_uri(class_uri: &str) -> Option<String> {
    let split = class_uri.rfind('#').or_else(|| class_uri.rfind('/'))?;
    Some(class_uri[..=split].to_string())
}

pub fn acronym_from_ontology_link(link: &str) -> String {
    match link.rfind("/ontologies/") {
        Some(idx) => link[idx + "/ontologies/".len()..].to_string(),
        None => link.rsplit('/').next().unwrap_or(link).to_string(),
    }
}

pub fn parse_class_ref(raw: &Value, path: &str) -> Result<ClassRef, OntoError> {
    let iri = required_str(raw, "@id", path)?;
    let link = raw
        .get("links")
        .and_then(|v| v.get("ontology"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| OntoError::unexpected(path, format!("class <{iri}> has no ontology link")))?;
    Ok(ClassRef {
        iri,
        ontology_acronym: acronym_from_ontology_link(link),
    })
}

// `classes` holds the queried class first, the target second.
pub fn parse_mappings(raw: &Value, path: &str) -> Result<Vec<ClassMapping>, OntoError> {
    let items = raw
        .as_array()
        .ok_or_else(|| OntoError::unexpected(path, "mappings are not an array"))?;

    let mut mappings = Vec::with_capacity(items.len());
    for item in items {
        let target = item
            .get("classes")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.get(1))
            .ok_or_else(|| OntoError::unexpected(path, "mapping without a target class"))?;
        mappings.push(ClassMapping {
            id: optional_string(item, "id"),
            source: optional_string(item, "source"),
            process: optional_string(item, "process"),
            target_class: parse_class_ref(target, path)?,
        });
    }
    Ok(mappings)
}

pub fn parse_annotations(raw: &Value, path: &str) -> Result<Vec<TextAnnotation>, OntoError> {
    let items = raw
        .as_array()
        .ok_or_else(|| OntoError::unexpected(path, "annotations are not an array"))?;

    let mut annotations = Vec::with_capacity(items.len());
    for item in items {
        let annotated_class = item
            .get("annotatedClass")
            .ok_or_else(|| OntoError::unexpected(path, "annotation without annotatedClass"))?;
        let annotated_class = parse_class_ref(annotated_class, path)?;

        let mut hierarchy = Vec::new();
        if let Some(entries) = item.get("hierarchy").and_then(|v| v.as_array()) {
            for entry in entries {
                let class = entry.get("annotatedClass").ok_or_else(|| {
                    OntoError::unexpected(path, "hierarchy entry without annotatedClass")
                })?;
                hierarchy.push(HierarchyEntry {
                    class_ref: parse_class_ref(class, path)?,
                    distance: entry.get("distance").and_then(|v| v.as_i64()).unwrap_or(0),
                });
            }
        }

        let mut spans = Vec::new();
        if let Some(entries) = item.get("annotations").and_then(|v| v.as_array()) {
            for entry in entries {
                spans.push(AnnotationSpan {
                    from: entry.get("from").and_then(|v| v.as_i64()).unwrap_or(0),
                    to: entry.get("to").and_then(|v| v.as_i64()).unwrap_or(0),
                    match_type: optional_string(entry, "matchType"),
                    matched_text: optional_string(entry, "text"),
                });
            }
        }

        annotations.push(TextAnnotation {
            annotated_class,
            hierarchy,
            spans,
        });
    }
    Ok(annotations)
}

fn required_str(raw: &Value, field: &str, path: &str) -> Result<String, OntoError> {
    raw.get(field)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| OntoError::unexpected(path, format!("missing '{field}'")))
}

fn optional_string(raw: &Value, field: &str) -> String {
    raw.get(field)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn string_set(raw: Option<&Value>) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    match raw {
        Some(Value::Array(items)) => {
            for item in items {
                if let Some(value) = item.as_str() {
                    out.insert(value.to_string());
                }
            }
        }
        Some(Value::String(value)) => {
            out.insert(value.clone());
        }
        _ => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn class_fields_are_extracted() {
        let raw = json!({
            "@id": "http://www.ebi.ac.uk/efo/EFO_0000270",
            "prefLabel": "asthma",
            "synonym": ["Hyperreactive airway disease", "asthmatic"],
            "definition": ["A bronchial disease."],
            "obsolete": false
        });
        let class = parse_ontology_class("EFO", &raw, "/x").unwrap();
        assert_eq!(class.preferred_label.as_deref(), Some("asthma"));
        assert!(class.synonyms.contains("Hyperreactive airway disease"));
        assert_eq!(class.definitions.len(), 1);
        assert!(!class.obsolete);
    }

    #[test]
    fn class_without_id_is_rejected() {
        let raw = json!({ "prefLabel": "asthma" });
        assert!(parse_ontology_class("EFO", &raw, "/x").is_err());
    }

    #[test]
    fn prefix_guess_prefers_hash() {
        assert_eq!(
            prefix_from_class_uri("http://a.org/onto.owl#Thing").as_deref(),
            Some("http://a.org/onto.owl#")
        );
        assert_eq!(
            prefix_from_class_uri("http://a.org/onto/T1").as_deref(),
            Some("http://a.org/onto/")
        );
        assert_eq!(prefix_from_class_uri("urn-no-split"), None);
    }

    #[test]
    fn acronym_from_link() {
        assert_eq!(
            acronym_from_ontology_link("http://data.bioontology.org/ontologies/MESH"),
            "MESH"
        );
        assert_eq!(
            acronym_from_ontology_link("http://localhost:8080/api/ontologies/NCBITaxon"),
            "NCBITaxon"
        );
    }
}
