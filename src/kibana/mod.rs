//! Kibana API interaction module
//!
//! # Module Structure
//!
//! - [`auth`] - Credential variants and how they are attached to requests
//! - [`client`] - Main Kibana client holding the endpoint and HTTP client
//! - [`http`] - Request template (standard headers) and response handling
//! - [`saved_objects`] - Import/export translation for saved objects
//!
//! # Example
//!
//! ```ignore
//! use elasticstack_provider::kibana::{client::{ConnectionConfig, KibanaClient}, auth::Credentials};
//! use elasticstack_provider::kibana::saved_objects::get_saved_object;
//!
//! async fn example() -> elasticstack_provider::Result<()> {
//!     let config = ConnectionConfig::new("http://localhost:5601", Credentials::None);
//!     let client = KibanaClient::new(&config)?;
//!     let dashboard = get_saved_object(&client, "d-1", "default", "dashboard").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod saved_objects;
