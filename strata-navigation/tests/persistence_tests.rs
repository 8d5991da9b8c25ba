mod common;

use common::{obj, MemoryPersistence};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use strata_navigation::PersistedConfigAdapter;

fn stored_products() -> std::sync::Arc<MemoryPersistence> {
    MemoryPersistence::with(
        "products",
        json!({
            "name": "My products",
            "pagination": false,
            "schema": {"properties": {"name": {"title": "Custom"}}}
        }),
    )
}

#[test]
fn disabled_adapter_reads_nothing() {
    let adapter = PersistedConfigAdapter::disabled();
    assert!(!adapter.is_enabled());
    assert!(adapter.collection_override("products").is_none());
    assert!(adapter.schema_override("products").is_none());
    adapter.record_modification("products", &obj(json!({"name": "x"})));
}

#[test]
fn collection_override_excludes_schema() {
    let adapter = PersistedConfigAdapter::new(stored_products());
    let config = adapter.collection_override("products").unwrap();
    assert_eq!(
        Value::Object(config),
        json!({"name": "My products", "pagination": false})
    );
}

#[test]
fn schema_override_is_only_the_schema_part() {
    let adapter = PersistedConfigAdapter::new(stored_products());
    assert_eq!(
        Value::Object(adapter.schema_override("products").unwrap()),
        json!({"properties": {"name": {"title": "Custom"}}})
    );
    assert_eq!(
        Value::Object(adapter.property_overrides("products").unwrap()),
        json!({"name": {"title": "Custom"}})
    );
}

#[test]
fn reads_are_keyed_by_raw_path() {
    let adapter = PersistedConfigAdapter::new(stored_products());
    assert!(adapter.collection_override("/products/").is_none());
    assert!(adapter.collection_override("orders").is_none());
}

#[test]
fn non_object_schema_is_ignored() {
    let adapter = PersistedConfigAdapter::new(MemoryPersistence::with(
        "products",
        json!({"schema": "broken"}),
    ));
    assert!(adapter.schema_override("products").is_none());
    assert!(adapter.property_overrides("products").is_none());
}

#[test]
fn record_modification_deep_merges_into_stored_config() {
    let persistence = stored_products();
    let adapter = PersistedConfigAdapter::new(persistence.clone());

    adapter.record_modification(
        "products",
        &obj(json!({"schema": {"properties": {"price": {"title": "Cost"}}}})),
    );

    assert_eq!(
        Value::Object(persistence.stored("products").unwrap()),
        json!({
            "name": "My products",
            "pagination": false,
            "schema": {"properties": {
                "name": {"title": "Custom"},
                "price": {"title": "Cost"}
            }}
        })
    );
}

#[test]
fn record_modification_creates_missing_config() {
    let persistence = stored_products();
    let adapter = PersistedConfigAdapter::new(persistence.clone());
    adapter.record_modification("orders", &obj(json!({"group": "Sales"})));
    assert_eq!(
        Value::Object(persistence.stored("orders").unwrap()),
        json!({"group": "Sales"})
    );
}
