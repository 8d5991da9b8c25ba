use crate::schema::{EntitySchema, EntityValues};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Optional lifecycle hooks attached to a collection.
///
/// The navigation engine never calls these; it only carries them through
/// resolution so the data layer can invoke them on save and delete.
pub trait EntityCallbacks: Send + Sync {
    /// Called before an entity is saved. Return `Err(message)` to reject the write.
    fn on_pre_save(
        &self,
        path: &str,
        entity_id: Option<&str>,
        values: EntityValues,
    ) -> Result<EntityValues, String> {
        let _ = (path, entity_id);
        Ok(values)
    }

    /// Called after an entity was saved.
    fn on_save_success(&self, path: &str, entity_id: &str, values: &EntityValues) {
        let _ = (path, entity_id, values);
    }

    /// Called after an entity was deleted.
    fn on_delete(&self, path: &str, entity_id: &str) {
        let _ = (path, entity_id);
    }
}

fn granted() -> bool {
    true
}

/// What the current user may do with the entities of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default = "granted")]
    pub read: bool,
    #[serde(default = "granted")]
    pub create: bool,
    #[serde(default = "granted")]
    pub edit: bool,
    #[serde(default = "granted")]
    pub delete: bool,
}

impl Permissions {
    pub const fn all() -> Self {
        Self {
            read: true,
            create: true,
            edit: true,
            delete: true,
        }
    }

    pub const fn read_only() -> Self {
        Self {
            read: true,
            create: false,
            edit: false,
            delete: false,
        }
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::all()
    }
}

/// A navigable collection of entities.
///
/// Only the serializable part (path, naming, permissions and free-form
/// `settings`) takes part in persisted per-user overrides. The schema,
/// subcollections and callbacks are structural and never read from JSON.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct EntityCollection {
    /// Path relative to the parent collection (or the root for top-level ones).
    pub path: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    #[serde(skip)]
    pub schema: EntitySchema,
    #[serde(skip)]
    pub subcollections: Option<Vec<EntityCollection>>,
    #[serde(skip)]
    pub callbacks: Option<Arc<dyn EntityCallbacks>>,
    /// Display settings interpreted by the UI (pagination, default sort, ...).
    #[serde(default, flatten)]
    pub settings: Map<String, Value>,
}

impl EntityCollection {
    pub fn new(path: impl Into<String>, name: impl Into<String>, schema: EntitySchema) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            schema,
            ..Default::default()
        }
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn with_subcollection(mut self, subcollection: EntityCollection) -> Self {
        self.subcollections
            .get_or_insert_with(Vec::new)
            .push(subcollection);
        self
    }

    pub fn with_callbacks(mut self, callbacks: Arc<dyn EntityCallbacks>) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }
}

impl fmt::Debug for EntityCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCollection")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("group", &self.group)
            .field("icon", &self.icon)
            .field("permissions", &self.permissions)
            .field("schema", &self.schema)
            .field("subcollections", &self.subcollections)
            .field("callbacks", &self.callbacks.as_ref().map(|_| ".."))
            .field("settings", &self.settings)
            .finish()
    }
}

/// A custom top-level view shown next to the collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsView {
    pub path: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// The navigation tree: ordered top-level collections and optional extra views.
#[derive(Debug, Clone, Default)]
pub struct Navigation {
    pub collections: Vec<EntityCollection>,
    pub views: Option<Vec<CmsView>>,
}

impl From<Vec<EntityCollection>> for Navigation {
    fn from(collections: Vec<EntityCollection>) -> Self {
        Self {
            collections,
            views: None,
        }
    }
}
