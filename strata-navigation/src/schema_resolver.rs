//! Builds the [`SchemaResolver`] of a collection.

use crate::merge::merge_deep;
use crate::persistence::PersistedConfigAdapter;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use strata_model::{compute_properties, EntitySchema, Property, ResolvedSchema, SchemaResolver};
use tracing::warn;

/// Returns a resolver that, per call, evaluates the schema's property builders
/// against the given values (or the schema defaults) and deep-merges the
/// persisted property overrides of `path` on top.
///
/// Persisted overrides are read on every call, so edits recorded after the
/// resolver was built are picked up. Overrides of properties the computed
/// schema does not define are skipped, never added.
pub fn build_schema_resolver(
    schema: EntitySchema,
    path: &str,
    persisted: PersistedConfigAdapter,
) -> SchemaResolver {
    let schema = Arc::new(schema);
    let path = path.to_string();
    SchemaResolver::new(move |props| {
        let stored = persisted.property_overrides(&path);
        let values = props.values.or(schema.default_values.as_ref());
        let computed = compute_properties(&schema.properties, &path, props.entity_id, values);
        let properties = match stored {
            Some(stored) => apply_property_overrides(computed, &stored, &path),
            None => computed,
        };
        ResolvedSchema {
            name: schema.name.clone(),
            description: schema.description.clone(),
            properties,
            default_values: schema.default_values.clone(),
            original_schema: Arc::clone(&schema),
        }
    })
}

fn apply_property_overrides(
    mut properties: IndexMap<String, Property>,
    overrides: &Map<String, Value>,
    path: &str,
) -> IndexMap<String, Property> {
    for (key, overlay) in overrides {
        let Some(property) = properties.get_mut(key) else {
            warn!(path, property = %key, "ignoring persisted override of unknown property");
            continue;
        };
        match merge_property(property, overlay) {
            Ok(merged) => *property = merged,
            Err(e) => warn!(path, property = %key, error = %e, "ignoring invalid persisted property override"),
        }
    }
    properties
}

fn merge_property(property: &Property, overlay: &Value) -> serde_json::Result<Property> {
    let base = serde_json::to_value(property)?;
    serde_json::from_value(merge_deep(&base, overlay))
}
