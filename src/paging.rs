use std::collections::BTreeSet;

use serde_json::Value;
use tracing::debug;

use crate::dispatch::Dispatcher;
use crate::domain::OntologyClassRef;
use crate::error::OntoError;
use crate::parse::parse_ontology_class;
use crate::transport::Transport;

pub fn collect_unpaged<T: Transport>(
    dispatcher: &Dispatcher<T>,
    path: &str,
    ontology_acronym: &str,
) -> Result<BTreeSet<OntologyClassRef>, OntoError> {
    let mut result = BTreeSet::new();
    let Some(raw) = dispatcher.invoke(path, &[])? else {
        return Ok(result);
    };
    let items = raw
        .as_array()
        .ok_or_else(|| OntoError::unexpected(path, "expected an array of classes"))?;
    for item in items {
        result.insert(parse_ontology_class(ontology_acronym, item, path)?);
    }
    Ok(result)
}

// Missing `pageCount` means one page; a page without `collection` adds nothing.
pub fn collect_paged<T: Transport>(
    dispatcher: &Dispatcher<T>,
    path: &str,
    ontology_acronym: &str,
) -> Result<BTreeSet<OntologyClassRef>, OntoError> {
    let mut result = BTreeSet::new();
    let Some(first) = dispatcher.invoke(path, &[])? else {
        return Ok(result);
    };

    let page_count = first
        .get("pageCount")
        .and_then(|v| v.as_u64())
        .unwrap_or(1)
        .max(1);
    merge_page(&mut result, &first, path, ontology_acronym)?;

    for page in 2..=page_count {
        let page_param = page.to_string();
        match dispatcher.invoke(path, &[("page", page_param.as_str())])? {
            Some(raw) => merge_page(&mut result, &raw, path, ontology_acronym)?,
            None => debug!(path, page, "page vanished while paging"),
        }
    }
    Ok(result)
}

fn merge_page(
    result: &mut BTreeSet<OntologyClassRef>,
    raw: &Value,
    path: &str,
    ontology_acronym: &str,
) -> Result<(), OntoError> {
    if let Some(items) = raw.get("collection").and_then(|v| v.as_array()) {
        for item in items {
            result.insert(parse_ontology_class(ontology_acronym, item, path)?);
        }
    }
    Ok(())
}
