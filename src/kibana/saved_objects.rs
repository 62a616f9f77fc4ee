//! Kibana Saved Objects
//!
//! Saved objects have no typed schema at the API boundary, so they are
//! written through the bulk import endpoint (one ndjson line uploaded as a
//! file) and read back through the export endpoint. Attributes stay a
//! generic JSON map the whole way through.

use super::client::{KibanaClient, DEFAULT_SPACE};
use crate::error::{ProviderError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const IMPORT_PATH: &str = "/api/saved_objects/_import";
pub const EXPORT_PATH: &str = "/api/saved_objects/_export";

/// File name Kibana sees for the uploaded import payload
pub const IMPORT_FILE_NAME: &str = "import.ndjson";
const NDJSON_MIME: &str = "application/ndjson";

/// One saved object as the provider sees it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SavedObject {
    /// Empty until Kibana has assigned one (or the caller picked one)
    pub id: String,
    pub space_id: String,
    pub attributes: Map<String, Value>,
}

impl SavedObject {
    pub fn new(id: impl Into<String>, space_id: impl Into<String>, attributes: Map<String, Value>) -> Self {
        let space_id = space_id.into();
        Self {
            id: id.into(),
            space_id: if space_id.is_empty() {
                DEFAULT_SPACE.to_string()
            } else {
                space_id
            },
            attributes,
        }
    }

    /// Build from the string form of the attributes
    pub fn from_json_str(
        id: impl Into<String>,
        space_id: impl Into<String>,
        attributes: &str,
    ) -> Result<Self> {
        Ok(Self::new(id, space_id, parse_attributes(attributes)?))
    }

    /// Attributes re-serialized to their string form
    pub fn attributes_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.attributes)?)
    }
}

/// Canonicalize a JSON string into an attribute map
pub fn parse_attributes(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ProviderError::InvalidAttributes(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(ProviderError::InvalidAttributes(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Import
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSuccess {
    #[serde(default)]
    pub id: String,
    /// Set when Kibana stored the object under a different id
    #[serde(default)]
    pub destination_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportError {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub error: Value,
}

impl ImportError {
    fn describe(&self) -> String {
        let kind = self
            .error
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        match self.error.get("message").and_then(|v| v.as_str()) {
            Some(message) => format!("{} ({}): {}", self.id, kind, message),
            None => format!("{} ({})", self.id, kind),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub success_results: Vec<ImportSuccess>,
    #[serde(default)]
    pub errors: Vec<ImportError>,
}

/// The object written on the single ndjson line: attributes plus `id` when set
pub fn import_entry(object: &SavedObject) -> Map<String, Value> {
    let mut entry = object.attributes.clone();
    if object.id.is_empty() {
        entry.remove("id");
    } else {
        entry.insert("id".to_string(), Value::String(object.id.clone()));
    }
    entry
}

/// Serialize an object as newline-delimited JSON (one line)
pub fn to_ndjson(object: &SavedObject) -> Result<String> {
    let mut line = serde_json::to_string(&import_entry(object))?;
    line.push('\n');
    Ok(line)
}

/// Wrap an ndjson payload as the `file` upload the import endpoint expects
pub fn import_form(ndjson: String) -> Result<Form> {
    let part = Part::text(ndjson)
        .file_name(IMPORT_FILE_NAME)
        .mime_str(NDJSON_MIME)?;
    Ok(Form::new().part("file", part))
}

/// Pick the canonical id out of an import response body
pub fn resolve_import(body: &str) -> Result<String> {
    let response: ImportResponse = serde_json::from_str(body)?;

    if response.success_count == 0 {
        let reason = response
            .errors
            .first()
            .map(ImportError::describe)
            .unwrap_or_else(|| "no objects were imported".to_string());
        return Err(ProviderError::ImportFailed(reason));
    }

    let first = response.success_results.first().ok_or_else(|| {
        ProviderError::ImportFailed("import reported success without results".to_string())
    })?;

    Ok(first
        .destination_id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| first.id.clone()))
}

/// Import a saved object (overwriting any existing one) and return it with
/// the id Kibana assigned
pub async fn create_saved_object(client: &KibanaClient, object: &SavedObject) -> Result<SavedObject> {
    let ndjson = to_ndjson(object)?;
    let url = client.space_url(&object.space_id, IMPORT_PATH);

    let body = client
        .http
        .post_multipart(&url, &[("overwrite", "true")], import_form(ndjson)?)
        .await?;

    let id = resolve_import(&body)?;
    tracing::debug!("Imported saved object {} into space {}", id, object.space_id);

    Ok(SavedObject {
        id,
        ..object.clone()
    })
}

// =============================================================================
// Export
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportObjectRef {
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub objects: Vec<ExportObjectRef>,
    pub include_references_deep: bool,
    pub exclude_export_details: bool,
}

impl ExportRequest {
    /// Request exactly one object, without references or export details
    pub fn single(object_type: &str, id: &str) -> Self {
        Self {
            objects: vec![ExportObjectRef {
                object_type: object_type.to_string(),
                id: id.to_string(),
            }],
            include_references_deep: false,
            exclude_export_details: true,
        }
    }
}

/// Flat export shape: `{"id", "type", "attributes"}`.
///
/// Only these fields are typed; anything else on the entry is either
/// metadata or, in the legacy shape, an inline attribute.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExportedObject {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "type")]
    pub object_type: String,
    #[serde(default)]
    pub attributes: Option<Map<String, Value>>,
}

/// Keys of a legacy export entry that are not attributes
const LEGACY_METADATA_KEYS: &[&str] = &["id", "type", "references"];

/// Pick the exported entry out of a response body.
///
/// The body is read as a stream of JSON values, which covers a single
/// (possibly pretty-printed) object as well as Kibana's ndjson export
/// stream; only the first value is considered. The legacy
/// `{"objects": [...]}` wrapper is unwrapped to its first element.
fn first_exported_value(body: &str) -> Result<Option<Value>> {
    let mut stream = serde_json::Deserializer::from_str(body).into_iter::<Value>();
    let Some(value) = stream.next().transpose()? else {
        return Ok(None);
    };

    match value {
        Value::Object(mut map) => match map.remove("objects") {
            Some(Value::Array(objects)) => Ok(objects.into_iter().next()),
            Some(other) => {
                map.insert("objects".to_string(), other);
                Ok(Some(Value::Object(map)))
            }
            None => Ok(Some(Value::Object(map))),
        },
        other => Err(ProviderError::Decode(format!(
            "expected an exported object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Decode an export response into a saved object.
///
/// An empty or absent id means Kibana did not export anything for the
/// request and yields [`ProviderError::NotFound`].
pub fn decode_export(body: &str, space_id: &str, object_type: &str, requested_id: &str) -> Result<SavedObject> {
    let not_found = || ProviderError::NotFound {
        object_type: object_type.to_string(),
        id: requested_id.to_string(),
    };

    let Some(value) = first_exported_value(body)? else {
        return Err(not_found());
    };

    let exported: ExportedObject = serde_json::from_value(value.clone())?;
    if exported.id.is_empty() {
        return Err(not_found());
    }

    let mut attributes = match exported.attributes {
        Some(attributes) => attributes,
        None => {
            // legacy entries carry their attributes inline
            let mut inline = match value {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            for key in LEGACY_METADATA_KEYS {
                inline.remove(*key);
            }
            inline
        }
    };
    attributes.remove("id");

    if !exported.object_type.is_empty() && exported.object_type != object_type {
        tracing::debug!(
            "Export returned type {} for requested type {}",
            exported.object_type,
            object_type
        );
    }

    Ok(SavedObject::new(exported.id, space_id, attributes))
}

/// Read a saved object through the export endpoint.
///
/// Returns `Ok(None)` when Kibana has no such object.
pub async fn get_saved_object(
    client: &KibanaClient,
    id: &str,
    space_id: &str,
    object_type: &str,
) -> Result<Option<SavedObject>> {
    let url = client.space_url(space_id, EXPORT_PATH);
    let request = ExportRequest::single(object_type, id);

    let body = match client.http.post_json(&url, &request).await {
        Ok(body) => body,
        Err(ProviderError::Api { status, .. }) if status == StatusCode::NOT_FOUND => {
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    match decode_export(&body, space_id, object_type, id) {
        Ok(object) => Ok(Some(object)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
