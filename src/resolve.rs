use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use crate::domain::{OntologyAcronym, OntologyRef, ResolvedRef};
use crate::error::OntoError;
use crate::registry::{self, OBO_PREFIX, OMIM_ACRONYM};

static ABSOLUTE_URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("static regex"));

pub fn is_absolute_uri(value: &str) -> bool {
    ABSOLUTE_URI.is_match(value)
}

// OBO URIs split at the last `_` so the acronym stays in the key; others at
// the last `#`, else the last `/`.
pub fn infer_acronym(class_uri: &str) -> Option<&'static str> {
    let obo_split = if class_uri.starts_with(OBO_PREFIX) {
        class_uri.rfind('_')
    } else {
        None
    };
    let split = obo_split
        .or_else(|| class_uri.rfind('#'))
        .or_else(|| class_uri.rfind('/'))?;
    registry::acronym_for_prefix(&class_uri[..=split])
}

pub fn resolve<F>(
    acronym: Option<&str>,
    accession: &str,
    ontology: F,
) -> Result<Option<ResolvedRef>, OntoError>
where
    F: FnOnce(&OntologyAcronym) -> Result<Option<Arc<OntologyRef>>, OntoError>,
{
    let accession = accession.trim();
    if accession.is_empty() {
        return Err(OntoError::InvalidArgument(
            "cannot query the ontology service without a term accession or URI".to_string(),
        ));
    }
    let acronym = acronym
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::parse::<OntologyAcronym>)
        .transpose()?;

    let (class_uri, acronym) = if is_absolute_uri(accession) {
        let acronym = match acronym {
            Some(acronym) => acronym,
            None => match infer_acronym(accession) {
                Some(inferred) => inferred.parse()?,
                None => {
                    debug!(
                        class_uri = accession,
                        "no known ontology for this URI, specify the defining ontology"
                    );
                    return Ok(None);
                }
            },
        };
        let class_uri = if acronym.as_str() == OMIM_ACRONYM {
            strip_omim_prefix(accession)
        } else {
            accession.to_string()
        };
        (class_uri, acronym)
    } else {
        let acronym = acronym.ok_or_else(|| {
            OntoError::InvalidArgument(format!(
                "accession '{accession}' is not a URI and no ontology was given"
            ))
        })?;
        if acronym.as_str() == OMIM_ACRONYM {
            (accession.to_string(), acronym)
        } else {
            let Some(onto) = ontology(&acronym)? else {
                debug!(%acronym, accession, "unknown ontology");
                return Ok(None);
            };
            let Some(prefix) = onto.class_uri_prefix.as_deref() else {
                debug!(%acronym, accession, "ontology has no known class URI prefix");
                return Ok(None);
            };
            (format!("{prefix}{accession}"), acronym)
        }
    };

    let class_uri = class_uri.trim();
    if class_uri.is_empty() {
        return Err(OntoError::InvalidArgument(format!(
            "'{accession}' resolves to an empty class identifier in {acronym}"
        )));
    }
    Ok(Some(ResolvedRef {
        class_uri: class_uri.to_string(),
        ontology_acronym: acronym,
    }))
}

fn strip_omim_prefix(class_uri: &str) -> String {
    registry::prefix_for(OMIM_ACRONYM)
        .and_then(|prefix| class_uri.strip_prefix(prefix))
        .unwrap_or(class_uri)
        .to_string()
}
