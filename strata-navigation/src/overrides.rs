//! Transient, session-scoped collection overrides keyed by side-panel key.

use crate::path::side_panel_key;
use crate::resolver::PartialCollectionResolver;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// An open view: a collection (`entity_id == None`) or a single entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewRef {
    pub path: String,
    pub entity_id: Option<String>,
}

impl ViewRef {
    pub fn collection(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            entity_id: None,
        }
    }

    pub fn entity(path: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            entity_id: Some(entity_id.into()),
        }
    }

    pub fn key(&self) -> String {
        side_panel_key(&self.path, self.entity_id.as_deref())
    }
}

/// A registered override and how it combines with the schema override handler.
#[derive(Debug, Clone)]
pub struct TransientOverride {
    pub config: PartialCollectionResolver,
    /// `None` behaves like `Some(true)`.
    pub override_schema_registry: Option<bool>,
}

impl TransientOverride {
    pub fn overrides_registry(&self) -> bool {
        self.override_schema_registry.unwrap_or(true)
    }

    /// Layers this override over `current`, the handler's result.
    ///
    /// Permissions, schema resolver, subcollections and callbacks already set in
    /// `current` are kept; missing ones are taken from the override. When the
    /// override is authoritative its remaining fields replace those of `current`.
    pub fn apply_to(&self, current: PartialCollectionResolver) -> PartialCollectionResolver {
        let transient = &self.config;
        let mut merged = if self.overrides_registry() {
            transient.clone()
        } else {
            current.clone()
        };
        merged.permissions = current.permissions.or(transient.permissions);
        merged.schema_resolver = current
            .schema_resolver
            .or_else(|| transient.schema_resolver.clone());
        merged.subcollections = current
            .subcollections
            .or_else(|| transient.subcollections.clone());
        merged.callbacks = current.callbacks.or_else(|| transient.callbacks.clone());
        merged
    }
}

/// At most one override per side-panel key; overrides never merge with each other.
#[derive(Debug, Default)]
pub struct OverrideStore {
    entries: HashMap<String, TransientOverride>,
}

impl OverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the override of a view and returns its key.
    /// Passing `None` removes the entry instead.
    pub fn set(
        &mut self,
        path: &str,
        entity_id: Option<&str>,
        config: Option<PartialCollectionResolver>,
        override_schema_registry: Option<bool>,
    ) -> Option<String> {
        let key = side_panel_key(path, entity_id);
        let Some(config) = config else {
            self.entries.remove(&key);
            return None;
        };
        debug!(key = %key, "registering transient override");
        self.entries.insert(
            key.clone(),
            TransientOverride {
                config,
                override_schema_registry,
            },
        );
        Some(key)
    }

    pub fn remove(&mut self, path: &str, entity_id: Option<&str>) {
        self.entries.remove(&side_panel_key(path, entity_id));
    }

    /// Drops every override whose view is not in `keep`.
    pub fn prune_except(&mut self, keep: &[ViewRef]) {
        let keep: HashSet<String> = keep.iter().map(ViewRef::key).collect();
        let before = self.entries.len();
        self.entries.retain(|key, _| keep.contains(key));
        debug!(removed = before - self.entries.len(), "pruned transient overrides");
    }

    pub fn get(&self, key: &str) -> Option<&TransientOverride> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read access to registered overrides during resolution.
///
/// Returns an owned copy so no lock outlives the lookup.
pub trait OverrideLookup {
    fn transient(&self, key: &str) -> Option<TransientOverride>;
}

impl OverrideLookup for OverrideStore {
    fn transient(&self, key: &str) -> Option<TransientOverride> {
        self.get(key).cloned()
    }
}

impl OverrideLookup for Mutex<OverrideStore> {
    fn transient(&self, key: &str) -> Option<TransientOverride> {
        self.lock().get(key).cloned()
    }
}
