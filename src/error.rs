use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Clone, Error, Diagnostic)]
pub enum OntoError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid ontology acronym: {0}")]
    InvalidAcronym(String),

    #[error("ontology service request failed: {0}")]
    ServiceHttp(String),

    #[error("ontology service returned status {status}: {message}")]
    ServiceStatus { status: u16, message: String },

    #[error("unexpected response from {path}: {message}")]
    UnexpectedResponse { path: String, message: String },

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl OntoError {
    pub fn unexpected(path: &str, message: impl Into<String>) -> Self {
        OntoError::UnexpectedResponse {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            OntoError::ServiceHttp(_)
                | OntoError::ServiceStatus { .. }
                | OntoError::UnexpectedResponse { .. }
        )
    }
}
