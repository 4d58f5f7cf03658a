use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::OntoError;

pub trait Transport: Send + Sync {
    fn get(&self, path: &str, params: &[(String, String)]) -> Result<Option<Value>, OntoError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, path: &str, params: &[(String, String)]) -> Result<Option<Value>, OntoError> {
        (**self).get(path, params)
    }
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, OntoError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("kira-onto-resolver/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| OntoError::InvalidConfig(err.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if api_key.trim().is_empty() {
            warn!("no API key configured, requests are sent unauthenticated");
        } else {
            let mut auth = HeaderValue::from_str(&format!("apikey token={}", api_key.trim()))
                .map_err(|err| OntoError::InvalidConfig(format!("api key: {err}")))?;
            auth.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| OntoError::ServiceHttp(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str, params: &[(String, String)]) -> Result<Option<Value>, OntoError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .map_err(|err| OntoError::ServiceHttp(err.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(path, "resource not found");
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "ontology service request failed".to_string());
            return Err(OntoError::ServiceStatus { status, message });
        }

        let raw: Value = response
            .json()
            .map_err(|err| OntoError::ServiceHttp(err.to_string()))?;
        Ok(Some(raw))
    }
}

pub fn encode_segment(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.as_bytes() {
        let ch = *byte as char;
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' || ch == '~' {
            out.push(ch);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}
