use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use kira_onto_resolver::client::OntologyClient;
use kira_onto_resolver::config::ResolvedConfig;
use kira_onto_resolver::discovery::{ANNOTATOR_PROVENANCE, DiscoveryOptions, TermDiscoverer};
use kira_onto_resolver::error::OntoError;
use kira_onto_resolver::throttle::RateLimiter;
use kira_onto_resolver::transport::{Transport, encode_segment};

const MELANOMA: &str = "http://www.ebi.ac.uk/efo/EFO_0000756";
const SKIN_CANCER: &str = "http://purl.obolibrary.org/obo/DOID_4159";

#[derive(Default)]
struct Annotator {
    routes: HashMap<String, Value>,
    queries: Mutex<Vec<String>>,
}

impl Annotator {
    fn route(mut self, key: &str, body: Value) -> Self {
        self.routes.insert(key.to_string(), body);
        self
    }
}

impl Transport for Annotator {
    fn get(&self, path: &str, params: &[(String, String)]) -> Result<Option<Value>, OntoError> {
        let mut key = path.to_string();
        for (idx, (name, value)) in params.iter().enumerate() {
            key.push(if idx == 0 { '?' } else { '&' });
            key.push_str(&format!("{name}={value}"));
        }
        self.queries.lock().unwrap().push(key.clone());
        Ok(self.routes.get(&key).cloned())
    }
}

fn hit(iri: &str, acronym: &str) -> Value {
    json!({
        "annotatedClass": {
            "@id": iri,
            "links": { "ontology": format!("http://data.bioontology.org/ontologies/{acronym}") }
        },
        "annotations": [{ "from": 1, "to": 8, "matchType": "PREF", "text": "MELANOMA" }]
    })
}

fn discoverer(
    annotator: Annotator,
    options: DiscoveryOptions,
) -> (TermDiscoverer<Arc<Annotator>>, Arc<Annotator>) {
    let annotator = Arc::new(annotator);
    let limiter = Arc::new(RateLimiter::new(1000.0).unwrap());
    let client = OntologyClient::new(Arc::clone(&annotator), limiter, &ResolvedConfig::default());
    (TermDiscoverer::new(Arc::new(client), options), annotator)
}

#[test]
fn duplicate_hits_are_merged() {
    let (discoverer, _) = discoverer(
        Annotator::default().route(
            "/annotator?text=melanoma&longest_only=true",
            json!([hit(MELANOMA, "EFO"), hit(MELANOMA, "EFO"), hit(SKIN_CANCER, "DOID")]),
        ),
        DiscoveryOptions::default(),
    );

    let terms = discoverer.discover("melanoma", None).unwrap();
    assert_eq!(terms.len(), 2);
    assert_eq!(terms[0].iri, MELANOMA);
    assert_eq!(terms[0].label, None);
    assert_eq!(terms[0].provenance, ANNOTATOR_PROVENANCE);
    assert_eq!(terms[1].iri, SKIN_CANCER);
}

#[test]
fn preferred_ontologies_fall_back_to_all() {
    let (discoverer, annotator) = discoverer(
        Annotator::default().route(
            "/annotator?text=melanoma&longest_only=true",
            json!([hit(SKIN_CANCER, "DOID")]),
        ),
        DiscoveryOptions {
            preferred_ontologies: Some("EFO".to_string()),
            ..DiscoveryOptions::default()
        },
    );

    let terms = discoverer.discover("melanoma", None).unwrap();
    assert_eq!(terms.len(), 1);
    assert_eq!(
        *annotator.queries.lock().unwrap(),
        vec![
            "/annotator?text=melanoma&longest_only=true&ontologies=EFO".to_string(),
            "/annotator?text=melanoma&longest_only=true".to_string(),
        ]
    );
}

#[test]
fn preferred_only_does_not_fall_back() {
    let (discoverer, annotator) = discoverer(
        Annotator::default().route(
            "/annotator?text=melanoma&longest_only=true",
            json!([hit(SKIN_CANCER, "DOID")]),
        ),
        DiscoveryOptions {
            preferred_ontologies: Some("EFO".to_string()),
            preferred_only: true,
            ..DiscoveryOptions::default()
        },
    );

    assert!(discoverer.discover("melanoma", None).unwrap().is_empty());
    assert_eq!(annotator.queries.lock().unwrap().len(), 1);
}

#[test]
fn type_label_is_tried_when_value_matches_nothing() {
    let (discoverer, _) = discoverer(
        Annotator::default().route(
            "/annotator?text=disease&longest_only=true",
            json!([hit(SKIN_CANCER, "DOID")]),
        ),
        DiscoveryOptions::default(),
    );

    let terms = discoverer.discover("xyzzy", Some("disease")).unwrap();
    assert_eq!(terms.len(), 1);
    assert_eq!(terms[0].iri, SKIN_CANCER);

    assert!(discoverer.discover("xyzzy", None).unwrap().is_empty());
    assert!(discoverer.discover("   ", Some("disease")).unwrap().is_empty());
}

#[test]
fn labels_are_fetched_and_unknown_classes_skipped() {
    let (discoverer, _) = discoverer(
        Annotator::default()
            .route(
                "/annotator?text=melanoma&longest_only=true",
                json!([hit(MELANOMA, "EFO"), hit(SKIN_CANCER, "DOID")]),
            )
            .route(
                &format!("/ontologies/EFO/classes/{}", encode_segment(MELANOMA)),
                json!({ "@id": MELANOMA, "prefLabel": "melanoma" }),
            ),
        DiscoveryOptions {
            fetch_labels: true,
            ..DiscoveryOptions::default()
        },
    );

    let terms = discoverer.discover("melanoma", None).unwrap();
    assert_eq!(terms.len(), 1);
    assert_eq!(terms[0].label.as_deref(), Some("melanoma"));
}
