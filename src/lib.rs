//! Kibana resource handlers for declarative infrastructure tooling.
//!
//! Resources (dashboards and other saved objects) are written through the
//! saved-object import API and read back through the export API. SLO error
//! budgets are read from the SLO API.

pub mod config;
pub mod error;
pub mod kibana;
pub mod resource;
pub mod slo;

pub use error::{ProviderError, Result};
