//! Kibana Client
//!
//! Main client for interacting with Kibana APIs, combining the connection
//! settings and HTTP functionality.

use super::auth::Credentials;
use super::http::KibanaHttpClient;
use crate::error::{ProviderError, Result};

/// Space used when a resource does not name one
pub const DEFAULT_SPACE: &str = "default";

/// Connection settings handed to the client at construction time
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub endpoint: String,
    pub credentials: Credentials,
}

impl ConnectionConfig {
    pub fn new(endpoint: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            endpoint: endpoint.into(),
            credentials,
        }
    }
}

/// Main Kibana client
#[derive(Clone)]
pub struct KibanaClient {
    pub http: KibanaHttpClient,
    base_url: String,
}

impl KibanaClient {
    /// Create a new Kibana client
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let parsed = url::Url::parse(&config.endpoint)
            .map_err(|e| ProviderError::Config(format!("invalid endpoint '{}': {}", config.endpoint, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProviderError::Config(format!(
                "endpoint must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        tracing::debug!(
            "Kibana client for {} (auth: {})",
            config.endpoint,
            config.credentials.kind()
        );

        Ok(Self {
            http: KibanaHttpClient::new(config.credentials.clone())?,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a space-aware API URL: `{base}/s/{space}{path}`
    pub fn space_url(&self, space_id: &str, path: &str) -> String {
        let space = if space_id.is_empty() {
            DEFAULT_SPACE
        } else {
            space_id
        };
        format!(
            "{}/s/{}{}",
            self.base_url,
            urlencoding::encode(space),
            path
        )
    }
}
