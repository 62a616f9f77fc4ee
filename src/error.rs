//! Provider errors
//!
//! Every fallible operation in the library returns [`ProviderError`]. Nothing
//! here is retried; callers decide what to surface.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised by the transport, translator, codec and resource handlers
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Kibana API returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("Failed to import saved object: {0}")]
    ImportFailed(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid attributes: {0}")]
    InvalidAttributes(String),

    #[error("{object_type} '{id}' not found")]
    NotFound { object_type: String, id: String },

    #[error("{0}")]
    UnsupportedOperation(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Wrong resource ID '{0}'. Resource ID must have following format: <space_id>/<resource identifier>")]
    MalformedIdentifier(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ProviderError {
    /// Whether this error only signals that the remote object is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
