//! Structural deep merge of JSON records.

use serde_json::{Map, Value};

/// Merges `overlay` over `base`.
///
/// Objects on both sides are merged key by key, recursively. Any other
/// overlay value replaces the base value, and a `null` overlay value removes
/// the key. A `null` overlay at the top level leaves `base` untouched.
pub fn merge_deep(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => Value::Object(merge_maps(base, overlay)),
        (base, Value::Null) => base.clone(),
        (_, overlay) => without_nulls(overlay),
    }
}

/// Object form of [`merge_deep`].
pub fn merge_maps(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    merge_into(&mut merged, overlay);
    merged
}

/// In-place form of [`merge_maps`].
pub fn merge_into(target: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        if value.is_null() {
            target.remove(key);
            continue;
        }
        if let (Some(Value::Object(existing)), Value::Object(nested)) = (target.get_mut(key), value) {
            merge_into(existing, nested);
            continue;
        }
        target.insert(key.clone(), without_nulls(value));
    }
}

// Inserted objects never carry `null` removal markers.
fn without_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(merge_maps(&Map::new(), map)),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_merge() {
        let base = json!({"a": {"x": 1, "y": 2}, "b": 1});
        let overlay = json!({"a": {"y": 3, "z": 4}});
        assert_eq!(
            merge_deep(&base, &overlay),
            json!({"a": {"x": 1, "y": 3, "z": 4}, "b": 1})
        );
    }

    #[test]
    fn arrays_and_scalars_replace() {
        let base = json!({"tags": [1, 2], "n": {"deep": true}});
        let overlay = json!({"tags": [3], "n": 5});
        assert_eq!(merge_deep(&base, &overlay), json!({"tags": [3], "n": 5}));
    }

    #[test]
    fn null_removes_key() {
        let base = json!({"a": 1, "b": {"c": 2, "d": 3}});
        let overlay = json!({"a": null, "b": {"c": null}});
        assert_eq!(merge_deep(&base, &overlay), json!({"b": {"d": 3}}));
    }

    #[test]
    fn absent_sides_do_not_fail() {
        assert_eq!(merge_deep(&json!({"a": 1}), &Value::Null), json!({"a": 1}));
        assert_eq!(merge_deep(&Value::Null, &json!({"a": 1})), json!({"a": 1}));
        assert_eq!(merge_deep(&Value::Null, &Value::Null), Value::Null);
    }
}
