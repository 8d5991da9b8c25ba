//! Per-user collection configuration persisted by the host.
//!
//! The engine never owns this storage. It reads the stored configuration of a
//! path through [`ConfigurationPersistence`] and splits it into a
//! collection-level part and a schema-level part.

use crate::merge::merge_maps;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// A stored partial collection. The optional partial schema lives under [`SCHEMA_KEY`].
pub type PersistedConfig = Map<String, Value>;

/// Reserved key holding the partial schema inside a [`PersistedConfig`].
pub const SCHEMA_KEY: &str = "schema";

const PROPERTIES_KEY: &str = "properties";

/// Reader/writer of persisted per-user configuration, keyed by raw path.
pub trait ConfigurationPersistence: Send + Sync {
    fn get_collection_config(&self, path: &str) -> Option<PersistedConfig>;

    fn on_collection_modified(&self, path: &str, config: PersistedConfig);
}

/// Accessors over an optional [`ConfigurationPersistence`].
#[derive(Clone, Default)]
pub struct PersistedConfigAdapter {
    persistence: Option<Arc<dyn ConfigurationPersistence>>,
}

impl PersistedConfigAdapter {
    pub fn new(persistence: Arc<dyn ConfigurationPersistence>) -> Self {
        Self {
            persistence: Some(persistence),
        }
    }

    /// An adapter with nothing behind it; every read is absent.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.persistence.is_some()
    }

    /// The stored configuration of `path` without its schema part.
    pub fn collection_override(&self, path: &str) -> Option<PersistedConfig> {
        let mut config = self.persistence.as_ref()?.get_collection_config(path)?;
        config.remove(SCHEMA_KEY);
        Some(config)
    }

    /// Only the schema part of the stored configuration of `path`.
    pub fn schema_override(&self, path: &str) -> Option<Map<String, Value>> {
        let config = self.persistence.as_ref()?.get_collection_config(path)?;
        match config.get(SCHEMA_KEY)? {
            Value::Object(schema) => Some(schema.clone()),
            _ => None,
        }
    }

    /// The `properties` part of [`schema_override`](Self::schema_override).
    pub fn property_overrides(&self, path: &str) -> Option<Map<String, Value>> {
        match self.schema_override(path)?.remove(PROPERTIES_KEY)? {
            Value::Object(properties) => Some(properties),
            _ => None,
        }
    }

    /// Deep-merges `partial` into the stored configuration of `path` and writes it back.
    pub fn record_modification(&self, path: &str, partial: &PersistedConfig) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let current = persistence.get_collection_config(path).unwrap_or_default();
        debug!(path, keys = partial.len(), "recording collection modification");
        persistence.on_collection_modified(path, merge_maps(&current, partial));
    }
}
