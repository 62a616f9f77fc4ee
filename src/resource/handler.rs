//! Saved-object resource handler
//!
//! Drives create/read/delete for one saved-object kind against the state
//! record owned by the external orchestration layer.

use super::composite_id::{self, CompositeId};
use super::registry::{require_kind, KindDef};
use crate::error::{ProviderError, Result};
use crate::kibana::client::{KibanaClient, DEFAULT_SPACE};
use crate::kibana::saved_objects::{self, SavedObject};
use serde::{Deserialize, Serialize};

/// State record for one resource, as stored by the external state layer.
///
/// `id` is the composite token; an empty `id` means the resource is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object_id: String,
    #[serde(default)]
    pub space_id: String,
    /// Attributes as a JSON document
    #[serde(default)]
    pub attributes: String,
}

impl ResourceData {
    /// Desired state for a new resource
    pub fn desired(object_id: &str, space_id: &str, attributes: &str) -> Self {
        Self {
            id: String::new(),
            object_id: object_id.to_string(),
            space_id: space_id.to_string(),
            attributes: attributes.to_string(),
        }
    }

    /// State that only knows its composite token (e.g. after an import)
    pub fn from_token(token: &str) -> Self {
        Self {
            id: token.to_string(),
            ..Self::default()
        }
    }

    pub fn is_absent(&self) -> bool {
        self.id.is_empty()
    }

    fn effective_space(&self) -> &str {
        if self.space_id.is_empty() {
            DEFAULT_SPACE
        } else {
            &self.space_id
        }
    }

    /// Convert the desired state into the in-memory saved object
    pub fn to_saved_object(&self) -> Result<SavedObject> {
        SavedObject::from_json_str(&self.object_id, self.effective_space(), &self.attributes)
    }

    fn apply(&mut self, object: &SavedObject) -> Result<()> {
        self.object_id = object.id.clone();
        self.space_id = object.space_id.clone();
        self.attributes = object.attributes_json()?;
        Ok(())
    }
}

/// Handler for one kind of saved object
#[derive(Clone)]
pub struct SavedObjectResource {
    client: KibanaClient,
    kind: &'static KindDef,
}

impl SavedObjectResource {
    pub fn new(client: KibanaClient, kind: &'static KindDef) -> Self {
        Self { client, kind }
    }

    /// Handler for a registered kind, by saved-object type
    pub fn for_type(client: KibanaClient, object_type: &str) -> Result<Self> {
        Ok(Self::new(client, require_kind(object_type)?))
    }

    pub fn dashboard(client: KibanaClient) -> Result<Self> {
        Self::for_type(client, "dashboard")
    }

    /// Import the desired object, record its identifier, then read it back
    /// so the state matches what Kibana stored.
    pub async fn create(&self, data: &mut ResourceData) -> Result<()> {
        let desired = data.to_saved_object()?;

        // the identifier must be storable before Kibana holds the object
        if desired.id.is_empty() {
            composite_id::validate_space(&desired.space_id)?;
        } else {
            CompositeId::new(desired.space_id.clone(), desired.id.clone())?;
        }

        let created = saved_objects::create_saved_object(&self.client, &desired).await?;

        let id = CompositeId::new(desired.space_id.clone(), created.id)?;
        tracing::info!("Created {} {}", self.kind.object_type, id);
        data.id = id.to_string();

        self.read(data).await
    }

    /// Imports overwrite in place, so an update is a create
    pub async fn update(&self, data: &mut ResourceData) -> Result<()> {
        self.create(data).await
    }

    /// Refresh the state from Kibana; clears the identifier when the object
    /// no longer exists.
    pub async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let id: CompositeId = data.id.parse()?;

        let found = saved_objects::get_saved_object(
            &self.client,
            &id.resource_id,
            &id.space_id,
            &self.kind.object_type,
        )
        .await?;

        match found {
            Some(object) => data.apply(&object),
            None => {
                tracing::info!("{} {} is gone, dropping it from state", self.kind.object_type, id);
                data.id.clear();
                Ok(())
            }
        }
    }

    /// Kibana offers no delete-by-reference for these objects
    pub async fn delete(&self, _data: &mut ResourceData) -> Result<()> {
        Err(ProviderError::UnsupportedOperation(format!(
            "Deleting {} is not supported",
            self.kind.plural
        )))
    }
}
