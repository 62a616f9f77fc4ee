//! Resource Registry - Load saved-object kinds from JSON
//!
//! The saved-object kinds the provider manages are declared in an embedded
//! JSON file and looked up by their Kibana type name.

use crate::error::{ProviderError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Embedded kind definitions (compiled into the binary)
const KINDS_FILE: &str = include_str!("../resources/saved_objects.json");

/// One saved-object kind
#[derive(Debug, Clone, Deserialize)]
pub struct KindDef {
    /// Kibana saved-object type, filled in from the map key
    #[serde(skip)]
    pub object_type: String,
    pub display_name: String,
    /// Plural used in user-facing messages
    pub plural: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct KindConfig {
    #[serde(default)]
    kinds: BTreeMap<String, KindDef>,
}

static REGISTRY: OnceLock<BTreeMap<String, KindDef>> = OnceLock::new();

/// Get the kind registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static BTreeMap<String, KindDef> {
    REGISTRY.get_or_init(|| {
        let config: KindConfig = serde_json::from_str(KINDS_FILE)
            .unwrap_or_else(|e| panic!("Failed to parse embedded saved object kinds: {}", e));

        config
            .kinds
            .into_iter()
            .map(|(key, mut def)| {
                def.object_type = key.clone();
                (key, def)
            })
            .collect()
    })
}

/// Get a kind definition by its saved-object type
pub fn get_kind(object_type: &str) -> Option<&'static KindDef> {
    get_registry().get(object_type)
}

/// Like [`get_kind`], but unknown kinds are an error
pub fn require_kind(object_type: &str) -> Result<&'static KindDef> {
    get_kind(object_type).ok_or_else(|| {
        ProviderError::Config(format!(
            "unknown saved object kind '{}' (known: {})",
            object_type,
            get_all_kinds().join(", ")
        ))
    })
}

/// All registered saved-object types, sorted
pub fn get_all_kinds() -> Vec<&'static str> {
    get_registry().keys().map(|s| s.as_str()).collect()
}
