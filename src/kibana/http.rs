//! HTTP utilities for Kibana REST API calls

use super::auth::Credentials;
use crate::error::{ProviderError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;

/// Anti-CSRF header Kibana requires on every mutating request
pub const XSRF_HEADER: &str = "kbn-xsrf";

/// Value sent in the anti-CSRF header
pub const PROVIDER_IDENTITY: &str = "elasticstack-provider";

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and drops control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Headers attached to every request before per-call overrides
pub fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(XSRF_HEADER, HeaderValue::from_static(PROVIDER_IDENTITY));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers
}

/// HTTP client wrapper for Kibana API calls
#[derive(Clone)]
pub struct KibanaHttpClient {
    client: Client,
    credentials: Credentials,
}

impl KibanaHttpClient {
    /// Create a new HTTP client
    pub fn new(credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("elasticstack-provider/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            credentials,
        })
    }

    /// Build a request template with the standard headers and credentials.
    ///
    /// `content_type` replaces the default JSON content type; `None` removes it
    /// so the body encoder (multipart) can set its own. A value that is not a
    /// valid header is an error.
    pub fn prepare(
        &self,
        method: Method,
        url: &str,
        content_type: Option<&str>,
    ) -> Result<RequestBuilder> {
        let mut headers = base_headers();
        match content_type {
            Some(value) => {
                let value = HeaderValue::from_str(value).map_err(|e| {
                    ProviderError::Config(format!("invalid content type {:?}: {}", value, e))
                })?;
                headers.insert(CONTENT_TYPE, value);
            }
            None => {
                headers.remove(CONTENT_TYPE);
            }
        }

        let request = self.client.request(method, url).headers(headers);
        Ok(self.credentials.apply(request))
    }

    /// Make a GET request and return the raw body
    pub async fn get(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {}", url);
        let request = self.prepare(Method::GET, url, Some(CONTENT_TYPE_JSON))?;
        send(request).await
    }

    /// Make a POST request with a JSON body and return the raw body
    pub async fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<String> {
        tracing::debug!("POST {}", url);
        let payload = serde_json::to_vec(body)?;
        let request = self
            .prepare(Method::POST, url, Some(CONTENT_TYPE_JSON))?
            .body(payload);
        send(request).await
    }

    /// Make a POST request with a multipart body and return the raw body
    pub async fn post_multipart(
        &self,
        url: &str,
        query: &[(&str, &str)],
        form: Form,
    ) -> Result<String> {
        tracing::debug!("POST {} (multipart)", url);
        let request = self
            .prepare(Method::POST, url, None)?
            .query(query)
            .multipart(form);
        send(request).await
    }
}

/// Send a request, turning non-2xx statuses into [`ProviderError::Api`]
async fn send(request: RequestBuilder) -> Result<String> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::debug!("API error: {} - {}", status, sanitize_for_log(&body));
        return Err(ProviderError::Api {
            status,
            body: sanitize_for_log(&body),
        });
    }

    Ok(body)
}

/// Format a provider error for display, with hints for common statuses
pub fn format_api_error(error: &ProviderError) -> String {
    match error {
        ProviderError::Api { status, .. } if *status == StatusCode::UNAUTHORIZED => {
            "Authentication failed. Check KIBANA_USERNAME/KIBANA_PASSWORD or KIBANA_API_KEY."
                .to_string()
        }
        ProviderError::Api { status, .. } if *status == StatusCode::FORBIDDEN => {
            "Permission denied. The user needs saved object management privileges in this space."
                .to_string()
        }
        ProviderError::Transport(err) if err.is_connect() => {
            "Could not connect to Kibana. Check the endpoint and network.".to_string()
        }
        other => other.to_string(),
    }
}
