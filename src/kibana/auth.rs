//! Kibana Authentication
//!
//! Credentials are passed through untouched: an API key, a username/password
//! pair, or nothing at all.

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::RequestBuilder;

/// Authorization scheme Kibana expects for API keys
pub const API_KEY_SCHEME: &str = "ApiKey";

/// Credential variant attached to every request
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    /// `Authorization: ApiKey <key>`
    ApiKey(String),
    /// HTTP basic authentication
    Basic { username: String, password: String },
    /// No credential configured; requests fall back to empty basic auth
    #[default]
    None,
}

impl Credentials {
    /// Pick a credential from optional config values.
    /// An API key wins over basic auth; basic auth needs a username.
    pub fn from_parts(
        api_key: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            return Credentials::ApiKey(key);
        }
        match username.filter(|u| !u.is_empty()) {
            Some(username) => Credentials::Basic {
                username,
                password: password.unwrap_or_default(),
            },
            None => Credentials::None,
        }
    }

    /// Attach this credential to an outgoing request
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::ApiKey(key) => {
                let value = format!("{} {}", API_KEY_SCHEME, key);
                match HeaderValue::from_str(&value) {
                    Ok(mut value) => {
                        value.set_sensitive(true);
                        request.header(AUTHORIZATION, value)
                    }
                    // reqwest reports the invalid header when the request is sent
                    Err(_) => request.header(AUTHORIZATION, value),
                }
            }
            Credentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            Credentials::None => {
                tracing::debug!("No credentials configured, using empty basic auth");
                request.basic_auth("", Some(""))
            }
        }
    }

    /// Short label for logs (never includes the secret)
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::ApiKey(_) => "api-key",
            Credentials::Basic { .. } => "basic",
            Credentials::None => "none",
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.write_str("ApiKey(***)"),
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Credentials::None => f.write_str("None"),
        }
    }
}
