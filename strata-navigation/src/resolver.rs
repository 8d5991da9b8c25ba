//! Layered collection resolution.
//!
//! Precedence, lowest first:
//! 1. the collection found in the navigation tree (or passed in directly),
//!    deep-merged with the persisted per-user collection override;
//! 2. the [`SchemaOverrideHandler`] result;
//! 3. the transient override registered for the view's side-panel key.
//!
//! Permissions, schema resolver, subcollections and callbacks are negotiated
//! field by field; the remaining collection fields pass through from layer 1
//! unless a higher layer sets them.

use crate::error::{NavigationError, NavigationResult};
use crate::merge::merge_deep;
use crate::overrides::OverrideLookup;
use crate::path::{canonicalize, find_collection, side_panel_key};
use crate::persistence::PersistedConfigAdapter;
use crate::schema_resolver::build_schema_resolver;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use strata_model::{
    EntityCallbacks, EntityCollection, EntitySchema, Navigation, Permissions, SchemaResolver,
};
use tracing::warn;

/// Persisted keys that never apply at collection level.
const STRUCTURAL_KEYS: [&str; 2] = ["subcollections", "callbacks"];

/// A partial [`CollectionResolver`], as produced by the schema override handler
/// or registered as a transient override.
#[derive(Clone, Default)]
pub struct PartialCollectionResolver {
    pub path: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub group: Option<String>,
    pub icon: Option<String>,
    /// Used to build a schema resolver when no layer supplies one.
    pub schema: Option<EntitySchema>,
    pub schema_resolver: Option<SchemaResolver>,
    pub permissions: Option<Permissions>,
    pub subcollections: Option<Vec<EntityCollection>>,
    pub callbacks: Option<Arc<dyn EntityCallbacks>>,
    pub settings: Map<String, Value>,
}

impl PartialCollectionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_schema(mut self, schema: EntitySchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_schema_resolver(mut self, schema_resolver: SchemaResolver) -> Self {
        self.schema_resolver = Some(schema_resolver);
        self
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn with_subcollections(mut self, subcollections: Vec<EntityCollection>) -> Self {
        self.subcollections = Some(subcollections);
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

impl fmt::Debug for PartialCollectionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialCollectionResolver")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("schema", &self.schema.as_ref().map(|s| &s.name))
            .field("schema_resolver", &self.schema_resolver.is_some())
            .field("permissions", &self.permissions)
            .field("subcollections", &self.subcollections.as_ref().map(Vec::len))
            .field("callbacks", &self.callbacks.is_some())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// A fully resolved collection. The schema is exposed as a resolver so it can
/// depend on the entity being shown.
#[derive(Clone)]
pub struct CollectionResolver {
    pub path: String,
    pub name: String,
    pub description: Option<String>,
    pub group: Option<String>,
    pub icon: Option<String>,
    /// The declared schema, when one was available.
    pub schema: Option<EntitySchema>,
    pub schema_resolver: SchemaResolver,
    pub permissions: Option<Permissions>,
    pub subcollections: Option<Vec<EntityCollection>>,
    pub callbacks: Option<Arc<dyn EntityCallbacks>>,
    pub settings: Map<String, Value>,
}

impl fmt::Debug for CollectionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionResolver")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("permissions", &self.permissions)
            .field("subcollections", &self.subcollections.as_ref().map(Vec::len))
            .field("callbacks", &self.callbacks.is_some())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Arguments handed to a [`SchemaOverrideHandler`].
#[derive(Debug, Clone, Copy)]
pub struct SchemaOverrideRequest<'a> {
    pub entity_id: Option<&'a str>,
    /// Canonical path of the view.
    pub path: &'a str,
}

/// Caller-supplied override consulted on every resolution.
pub trait SchemaOverrideHandler: Send + Sync {
    fn resolve(&self, request: SchemaOverrideRequest<'_>) -> Option<PartialCollectionResolver>;
}

impl<F> SchemaOverrideHandler for F
where
    F: Fn(SchemaOverrideRequest<'_>) -> Option<PartialCollectionResolver> + Send + Sync,
{
    fn resolve(&self, request: SchemaOverrideRequest<'_>) -> Option<PartialCollectionResolver> {
        self(request)
    }
}

/// One resolution pass over borrowed engine state. Never mutates its inputs.
pub struct Resolver<'a> {
    pub navigation: Option<&'a Navigation>,
    pub overrides: &'a dyn OverrideLookup,
    pub handler: Option<&'a dyn SchemaOverrideHandler>,
    pub persisted: &'a PersistedConfigAdapter,
}

impl Resolver<'_> {
    /// Resolves the view at `path` (and `entity_id`), using `collection` as
    /// the base instead of a tree lookup when given.
    pub fn resolve(
        &self,
        path: &str,
        entity_id: Option<&str>,
        collection: Option<&EntityCollection>,
    ) -> NavigationResult<CollectionResolver> {
        let base = collection.or_else(|| {
            self.navigation
                .and_then(|navigation| find_collection(path, &navigation.collections))
        });
        let resolved_collection = base.map(|base| self.apply_collection_override(base, path));

        let key = side_panel_key(path, entity_id);

        let mut result = self
            .handler
            .and_then(|handler| {
                handler.resolve(SchemaOverrideRequest {
                    entity_id,
                    path: canonicalize(path),
                })
            })
            .unwrap_or_default();

        if let Some(transient) = self.overrides.transient(&key) {
            result = transient.apply_to(result);
        }

        if let Some(collection) = &resolved_collection {
            if result.schema_resolver.is_none() {
                result.schema_resolver = Some(build_schema_resolver(
                    collection.schema.clone(),
                    path,
                    self.persisted.clone(),
                ));
            }
            result.subcollections = result
                .subcollections
                .or_else(|| collection.subcollections.clone());
            result.callbacks = result.callbacks.or_else(|| collection.callbacks.clone());
            result.permissions = result.permissions.or(collection.permissions);
        }

        let schema_resolver = match result.schema_resolver.take() {
            Some(schema_resolver) => schema_resolver,
            None => match &result.schema {
                Some(schema) => build_schema_resolver(schema.clone(), path, self.persisted.clone()),
                None => return Err(NavigationError::SchemaUnresolved { key }),
            },
        };

        Ok(assemble(resolved_collection, result, schema_resolver, path))
    }

    /// Deep-merges the persisted collection-level override of `path` into `base`.
    /// An override that cannot be applied is logged and skipped.
    fn apply_collection_override(&self, base: &EntityCollection, path: &str) -> EntityCollection {
        let Some(mut overlay) = self.persisted.collection_override(path) else {
            return base.clone();
        };
        for key in STRUCTURAL_KEYS {
            overlay.remove(key);
        }
        if overlay.is_empty() {
            return base.clone();
        }
        match merge_collection(base, overlay) {
            Ok(merged) => merged,
            Err(e) => {
                warn!(path, error = %e, "ignoring invalid persisted collection override");
                base.clone()
            }
        }
    }
}

fn merge_collection(
    base: &EntityCollection,
    overlay: Map<String, Value>,
) -> serde_json::Result<EntityCollection> {
    let merged = merge_deep(&serde_json::to_value(base)?, &Value::Object(overlay));
    let mut collection: EntityCollection = serde_json::from_value(merged)?;
    collection.schema = base.schema.clone();
    collection.subcollections = base.subcollections.clone();
    collection.callbacks = base.callbacks.clone();
    Ok(collection)
}

/// Shallow merge: `partial` wins over `base` field by field.
fn assemble(
    base: Option<EntityCollection>,
    partial: PartialCollectionResolver,
    schema_resolver: SchemaResolver,
    path: &str,
) -> CollectionResolver {
    match base {
        Some(base) => {
            let mut settings = base.settings;
            settings.extend(partial.settings);
            CollectionResolver {
                path: partial.path.unwrap_or(base.path),
                name: partial.name.unwrap_or(base.name),
                description: partial.description.or(base.description),
                group: partial.group.or(base.group),
                icon: partial.icon.or(base.icon),
                schema: partial.schema.or(Some(base.schema)),
                schema_resolver,
                permissions: partial.permissions,
                subcollections: partial.subcollections,
                callbacks: partial.callbacks,
                settings,
            }
        }
        None => {
            let path = partial
                .path
                .unwrap_or_else(|| canonicalize(path).to_string());
            let name = partial
                .name
                .or_else(|| partial.schema.as_ref().map(|schema| schema.name.clone()))
                .unwrap_or_else(|| path.clone());
            CollectionResolver {
                path,
                name,
                description: partial.description,
                group: partial.group,
                icon: partial.icon,
                schema: partial.schema,
                schema_resolver,
                permissions: partial.permissions,
                subcollections: partial.subcollections,
                callbacks: partial.callbacks,
                settings: partial.settings,
            }
        }
    }
}
