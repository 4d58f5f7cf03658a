use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::MemoCache;
use crate::config::ResolvedConfig;
use crate::dispatch::Dispatcher;
use crate::domain::{
    ClassMapping, OntologyAcronym, OntologyClassRef, OntologyRef, Relation, ResolvedRef,
    TextAnnotation,
};
use crate::error::OntoError;
use crate::paging::{collect_paged, collect_unpaged};
use crate::parse::{
    first_class_iri, ontology_name, parse_annotations, parse_mappings, parse_ontology_class,
    prefix_from_class_uri,
};
use crate::registry;
use crate::resolve;
use crate::throttle::RateLimiter;
use crate::transport::{HttpTransport, Transport, encode_segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub ontologies: u64,
    pub classes: u64,
    pub mappings: u64,
}

pub struct OntologyClient<T: Transport> {
    dispatcher: Dispatcher<T>,
    ontologies: MemoCache<OntologyAcronym, OntologyRef>,
    classes: MemoCache<ResolvedRef, OntologyClassRef>,
    mappings: MemoCache<String, Vec<ClassMapping>>,
}

impl OntologyClient<HttpTransport> {
    pub fn from_config(config: &ResolvedConfig) -> Result<Self, OntoError> {
        let transport =
            HttpTransport::new(&config.base_url, &config.api_key, config.request_timeout)?;
        let limiter = RateLimiter::shared(config.rate_limit)?;
        Ok(Self::new(transport, limiter, config))
    }
}

impl<T: Transport> OntologyClient<T> {
    pub fn new(transport: T, limiter: Arc<RateLimiter>, config: &ResolvedConfig) -> Self {
        let max = config.cache_max_size;
        let ttl = config.cache_ttl;
        Self {
            dispatcher: Dispatcher::new(transport, limiter, config.stats_interval),
            ontologies: MemoCache::new("ontologies", max, ttl),
            classes: MemoCache::new("classes", max, ttl),
            mappings: MemoCache::new("mappings", max, ttl),
        }
    }

    pub fn get_ontology(&self, acronym: &str) -> Result<Option<Arc<OntologyRef>>, OntoError> {
        let acronym: OntologyAcronym = acronym.parse()?;
        self.ontology(&acronym)
    }

    pub fn get_ontology_class(
        &self,
        acronym: Option<&str>,
        accession: &str,
    ) -> Result<Option<Arc<OntologyClassRef>>, OntoError> {
        let Some(resolved) = self.resolve(acronym, accession)? else {
            return Ok(None);
        };
        self.classes.get_or_fetch(resolved.clone(), || {
            let path = class_path(&resolved);
            match self.dispatcher.invoke(&path, &[])? {
                Some(raw) => {
                    parse_ontology_class(resolved.ontology_acronym.as_str(), &raw, &path).map(Some)
                }
                None => Ok(None),
            }
        })
    }

    pub fn resolve(
        &self,
        acronym: Option<&str>,
        accession: &str,
    ) -> Result<Option<ResolvedRef>, OntoError> {
        resolve::resolve(acronym, accession, |acronym| self.ontology(acronym))
    }

    pub fn get_class_children(
        &self,
        acronym: Option<&str>,
        accession: &str,
    ) -> Result<Option<BTreeSet<OntologyClassRef>>, OntoError> {
        self.class_collection(acronym, accession, Relation::Children)
    }

    pub fn get_class_descendants(
        &self,
        acronym: Option<&str>,
        accession: &str,
    ) -> Result<Option<BTreeSet<OntologyClassRef>>, OntoError> {
        self.class_collection(acronym, accession, Relation::Descendants)
    }

    pub fn get_class_parents(
        &self,
        acronym: Option<&str>,
        accession: &str,
    ) -> Result<Option<BTreeSet<OntologyClassRef>>, OntoError> {
        self.class_collection(acronym, accession, Relation::Parents)
    }

    pub fn get_class_ancestors(
        &self,
        acronym: Option<&str>,
        accession: &str,
    ) -> Result<Option<BTreeSet<OntologyClassRef>>, OntoError> {
        self.class_collection(acronym, accession, Relation::Ancestors)
    }

    pub fn class_collection(
        &self,
        acronym: Option<&str>,
        accession: &str,
        relation: Relation,
    ) -> Result<Option<BTreeSet<OntologyClassRef>>, OntoError> {
        let Some(resolved) = self.resolve(acronym, accession)? else {
            return Ok(None);
        };
        let path = format!("{}/{}", class_path(&resolved), relation.path_segment());
        let acronym = resolved.ontology_acronym.as_str();
        let classes = if relation.is_paged() {
            collect_paged(&self.dispatcher, &path, acronym)?
        } else {
            collect_unpaged(&self.dispatcher, &path, acronym)?
        };
        Ok(Some(classes))
    }

    pub fn get_text_annotations(
        &self,
        text: &str,
        extra_params: &[(&str, &str)],
    ) -> Result<Vec<TextAnnotation>, OntoError> {
        if text.trim().is_empty() {
            return Err(OntoError::InvalidArgument(
                "cannot annotate empty text".to_string(),
            ));
        }
        let mut params = Vec::with_capacity(extra_params.len() + 1);
        params.push(("text", text));
        params.extend_from_slice(extra_params);

        match self.dispatcher.invoke("/annotator", &params)? {
            Some(raw) => parse_annotations(&raw, "/annotator"),
            None => Ok(Vec::new()),
        }
    }

    pub fn get_ontology_class_mappings(
        &self,
        class: &OntologyClassRef,
    ) -> Result<Option<Arc<Vec<ClassMapping>>>, OntoError> {
        self.mappings.get_or_fetch(class.iri.clone(), || {
            let acronym: OntologyAcronym = class.ontology_acronym.parse()?;
            let path = format!(
                "/ontologies/{}/classes/{}/mappings",
                class_path_acronym(&acronym),
                encode_segment(&class.iri)
            );
            let Some(raw) = self.dispatcher.invoke(&path, &[])? else {
                return Ok(None);
            };
            let mappings = parse_mappings(&raw, &path)?;
            if mappings.is_empty() {
                debug!(iri = %class.iri, "no mappings");
                return Ok(None);
            }
            Ok(Some(mappings))
        })
    }

    pub fn get_ontology_class_mappings_preferred(
        &self,
        class: &OntologyClassRef,
        preferred_ontologies: Option<&str>,
        preferred_only: bool,
    ) -> Result<Option<Vec<ClassMapping>>, OntoError> {
        let Some(mappings) = self.get_ontology_class_mappings(class)? else {
            return Ok(None);
        };
        let preferred = parse_acronym_list(preferred_ontologies.unwrap_or_default());
        if preferred.is_empty() {
            return Ok(Some(mappings.to_vec()));
        }

        let filtered = mappings
            .iter()
            .filter(|mapping| {
                preferred.contains(&mapping.target_class.ontology_acronym.to_uppercase())
            })
            .cloned()
            .collect::<Vec<_>>();

        if filtered.is_empty() {
            if preferred_only {
                return Ok(None);
            }
            return Ok(Some(mappings.to_vec()));
        }
        Ok(Some(filtered))
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            ontologies: self.ontologies.entry_count(),
            classes: self.classes.entry_count(),
            mappings: self.mappings.entry_count(),
        }
    }

    pub fn invalidate_caches(&self) {
        self.ontologies.invalidate_all();
        self.classes.invalidate_all();
        self.mappings.invalidate_all();
    }

    pub fn call_stats(&self) -> (u64, u64) {
        self.dispatcher.stats()
    }

    fn ontology(&self, acronym: &OntologyAcronym) -> Result<Option<Arc<OntologyRef>>, OntoError> {
        self.ontologies
            .get_or_fetch(acronym.clone(), || self.fetch_ontology(acronym))
    }

    fn fetch_ontology(&self, acronym: &OntologyAcronym) -> Result<Option<OntologyRef>, OntoError> {
        let path = format!("/ontologies/{}", encode_segment(acronym.as_str()));
        let Some(raw) = self.dispatcher.invoke(&path, &[])? else {
            debug!(%acronym, "ontology not found");
            return Ok(None);
        };

        let class_uri_prefix = match registry::prefix_for(acronym.as_str()) {
            Some(prefix) => Some(prefix.to_string()),
            None => self.infer_class_uri_prefix(acronym, &path)?,
        };

        Ok(Some(OntologyRef {
            acronym: acronym.clone(),
            display_name: ontology_name(acronym.as_str(), &raw),
            class_uri_prefix,
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }))
    }

    // Ontologies spanning several namespaces get whatever the first class uses.
    fn infer_class_uri_prefix(
        &self,
        acronym: &OntologyAcronym,
        ontology_path: &str,
    ) -> Result<Option<String>, OntoError> {
        let path = format!("{ontology_path}/classes");
        let Some(raw) = self.dispatcher.invoke(&path, &[("pagesize", "2")])? else {
            return Ok(None);
        };
        let prefix = first_class_iri(&raw).and_then(|iri| prefix_from_class_uri(&iri));
        if prefix.is_none() {
            warn!(%acronym, "could not guess the class URI prefix");
        }
        Ok(prefix)
    }
}

fn class_path(resolved: &ResolvedRef) -> String {
    format!(
        "/ontologies/{}/classes/{}",
        class_path_acronym(&resolved.ontology_acronym),
        encode_segment(&resolved.class_uri)
    )
}

// Only the ontology metadata endpoint takes `NCBITaxon` mixed-case; class,
// relation and mapping endpoints want every acronym upper-cased.
fn class_path_acronym(acronym: &OntologyAcronym) -> String {
    encode_segment(&acronym.as_str().to_uppercase())
}

fn parse_acronym_list(value: &str) -> HashSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_uppercase)
        .collect()
}
