//! Configuration Management
//!
//! Connection settings come from CLI flags, then environment variables,
//! then the config file, then defaults.

use crate::kibana::auth::Credentials;
use crate::kibana::client::{ConnectionConfig, DEFAULT_SPACE};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5601";

pub const ENV_ENDPOINT: &str = "KIBANA_ENDPOINT";
pub const ENV_USERNAME: &str = "KIBANA_USERNAME";
pub const ENV_PASSWORD: &str = "KIBANA_PASSWORD";
pub const ENV_API_KEY: &str = "KIBANA_API_KEY";
pub const ENV_SPACE_ID: &str = "KIBANA_SPACE_ID";

/// Provider configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Kibana base URL
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Space used when a resource does not name one
    #[serde(default)]
    pub space_id: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("elasticstack-provider").join("config.json"))
    }

    /// Load configuration from disk, then apply environment overrides
    pub fn load() -> Self {
        let mut config = Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Load a config file; a missing or unreadable file yields the defaults
    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config file {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Override fields with non-empty environment values
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get(ENV_ENDPOINT) {
            self.endpoint = Some(v);
        }
        if let Some(v) = get(ENV_USERNAME) {
            self.username = Some(v);
        }
        if let Some(v) = get(ENV_PASSWORD) {
            self.password = Some(v);
        }
        if let Some(v) = get(ENV_API_KEY) {
            self.api_key = Some(v);
        }
        if let Some(v) = get(ENV_SPACE_ID) {
            self.space_id = Some(v);
        }
    }

    /// Get effective endpoint (CLI > env > config > default)
    pub fn effective_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    /// Get effective space (CLI > env > config > default)
    pub fn effective_space(&self) -> String {
        self.space_id
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SPACE.to_string())
    }

    /// Connection settings for the Kibana client
    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig::new(
            self.effective_endpoint(),
            Credentials::from_parts(
                self.api_key.clone(),
                self.username.clone(),
                self.password.clone(),
            ),
        )
    }
}
