//! Resource abstraction layer
//!
//! Maps declarative resources onto Kibana saved objects.
//!
//! # Architecture
//!
//! - [`composite_id`] - Packs `(space, id)` into the single token the state layer stores
//! - [`registry`] - Saved-object kinds loaded from embedded JSON
//! - [`handler`] - Create/read/update/delete orchestration for one kind
//!
//! # Example
//!
//! ```ignore
//! use elasticstack_provider::resource::{ResourceData, SavedObjectResource};
//!
//! async fn apply(client: KibanaClient) -> elasticstack_provider::Result<ResourceData> {
//!     let dashboards = SavedObjectResource::dashboard(client)?;
//!     let mut data = ResourceData::desired("", "default", r#"{"title":"Dash1"}"#);
//!     dashboards.create(&mut data).await?;
//!     Ok(data)
//! }
//! ```

pub mod composite_id;
mod handler;
mod registry;

pub use composite_id::CompositeId;
pub use handler::{ResourceData, SavedObjectResource};
pub use registry::*;
