use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::client::OntologyClient;
use crate::error::OntoError;
use crate::transport::Transport;

pub const ANNOTATOR_PROVENANCE: &str = "BioPortal Annotator";

#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    pub preferred_ontologies: Option<String>,
    pub preferred_only: bool,
    pub fetch_labels: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredTerm {
    pub iri: String,
    pub label: Option<String>,
    pub provenance: String,
}

pub struct TermDiscoverer<T: Transport> {
    client: Arc<OntologyClient<T>>,
    options: DiscoveryOptions,
}

impl<T: Transport> TermDiscoverer<T> {
    pub fn new(client: Arc<OntologyClient<T>>, options: DiscoveryOptions) -> Self {
        let preferred_ontologies = options
            .preferred_ontologies
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Self {
            client,
            options: DiscoveryOptions {
                preferred_ontologies,
                ..options
            },
        }
    }

    pub fn client(&self) -> &OntologyClient<T> {
        &self.client
    }

    pub fn discover(
        &self,
        value_label: &str,
        type_label: Option<&str>,
    ) -> Result<Vec<DiscoveredTerm>, OntoError> {
        let value_label = value_label.trim();
        if value_label.is_empty() {
            return Ok(Vec::new());
        }
        let terms = self.discover_text(value_label)?;
        if !terms.is_empty() {
            return Ok(terms);
        }
        match type_label.map(str::trim).filter(|label| !label.is_empty()) {
            Some(type_label) => {
                debug!(value_label, type_label, "no terms for value, trying type");
                self.discover_text(type_label)
            }
            None => Ok(terms),
        }
    }

    fn discover_text(&self, text: &str) -> Result<Vec<DiscoveredTerm>, OntoError> {
        let mut annotations = Vec::new();
        if let Some(preferred) = self.options.preferred_ontologies.as_deref() {
            annotations = self
                .client
                .get_text_annotations(text, &[("longest_only", "true"), ("ontologies", preferred)])?;
        }
        if annotations.is_empty()
            && (self.options.preferred_ontologies.is_none() || !self.options.preferred_only)
        {
            annotations = self
                .client
                .get_text_annotations(text, &[("longest_only", "true")])?;
        }

        let mut seen = HashSet::new();
        let mut terms = Vec::with_capacity(annotations.len());
        for annotation in annotations {
            let class = annotation.annotated_class;
            if !seen.insert(class.iri.clone()) {
                continue;
            }
            let label = if self.options.fetch_labels {
                let fetched = self
                    .client
                    .get_ontology_class(Some(&class.ontology_acronym), &class.iri)?;
                let Some(fetched) = fetched else {
                    debug!(iri = %class.iri, "annotated class not found, skipping");
                    continue;
                };
                fetched.preferred_label.clone()
            } else {
                None
            };
            terms.push(DiscoveredTerm {
                iri: class.iri,
                label,
                provenance: ANNOTATOR_PROVENANCE.to_string(),
            });
        }
        Ok(terms)
    }
}
