use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use strata_model::{
    CmsView, EntityCallbacks, EntityCollection, EntitySchema, EntityValues, Navigation,
    Permissions, Property,
};

fn make_products() -> EntityCollection {
    EntityCollection::new(
        "products",
        "Products",
        EntitySchema::new("Product").with_property("name", Property::string()),
    )
    .with_permissions(Permissions::read_only())
    .with_setting("pagination", json!(true))
    .with_subcollection(EntityCollection::new(
        "locales",
        "Locales",
        EntitySchema::new("Locale"),
    ))
}

// ── Permissions ──────────────────────────────────────────────────

#[test]
fn default_permissions_grant_everything() {
    assert_eq!(Permissions::default(), Permissions::all());
}

#[test]
fn missing_permission_flags_default_to_granted() {
    let p: Permissions = serde_json::from_value(json!({"delete": false})).unwrap();
    assert_eq!(
        p,
        Permissions {
            read: true,
            create: true,
            edit: true,
            delete: false
        }
    );
}

// ── EntityCollection ─────────────────────────────────────────────

#[test]
fn builder_methods_populate_fields() {
    let c = make_products();
    assert_eq!(c.path, "products");
    assert_eq!(c.permissions, Some(Permissions::read_only()));
    assert_eq!(c.settings.get("pagination"), Some(&json!(true)));
    assert_eq!(c.subcollections.as_ref().map(Vec::len), Some(1));
    assert!(c.callbacks.is_none());
}

#[test]
fn serialization_skips_structural_fields() {
    let json = serde_json::to_value(make_products()).unwrap();
    assert_eq!(
        json,
        json!({
            "path": "products",
            "name": "Products",
            "permissions": {"read": true, "create": false, "edit": false, "delete": false},
            "pagination": true
        })
    );
}

#[test]
fn deserialization_collects_unknown_keys_as_settings() {
    let c: EntityCollection = serde_json::from_value(json!({
        "path": "orders",
        "name": "Orders",
        "group": "Sales",
        "default_size": "m"
    }))
    .unwrap();
    assert_eq!(c.group.as_deref(), Some("Sales"));
    assert_eq!(c.settings.get("default_size"), Some(&json!("m")));
    assert!(c.schema.properties.is_empty());
}

// ── Callbacks ────────────────────────────────────────────────────

struct NoOpCallbacks;
impl EntityCallbacks for NoOpCallbacks {}

struct RejectEmptyName;
impl EntityCallbacks for RejectEmptyName {
    fn on_pre_save(
        &self,
        _path: &str,
        _entity_id: Option<&str>,
        values: EntityValues,
    ) -> Result<EntityValues, String> {
        match values.get("name").and_then(|v| v.as_str()) {
            Some(name) if !name.is_empty() => Ok(values),
            _ => Err("name is required".into()),
        }
    }
}

#[test]
fn default_pre_save_passes_values_through() {
    let values = json!({"name": "x"}).as_object().cloned().unwrap();
    let result = NoOpCallbacks.on_pre_save("products", None, values.clone());
    assert_eq!(result, Ok(values));
}

#[test]
fn custom_pre_save_can_reject() {
    let collection = make_products().with_callbacks(Arc::new(RejectEmptyName));
    let callbacks = collection.callbacks.unwrap();
    let empty = json!({"name": ""}).as_object().cloned().unwrap();
    assert_eq!(
        callbacks.on_pre_save("products", Some("p1"), empty),
        Err("name is required".to_string())
    );
}

// ── Navigation ───────────────────────────────────────────────────

#[test]
fn navigation_from_collections_has_no_views() {
    let nav = Navigation::from(vec![make_products()]);
    assert_eq!(nav.collections.len(), 1);
    assert!(nav.views.is_none());
}

#[test]
fn cms_view_serde() {
    let view = CmsView {
        path: "reports".into(),
        name: "Reports".into(),
        description: None,
        group: Some("Admin".into()),
    };
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json, json!({"path": "reports", "name": "Reports", "group": "Admin"}));
    let back: CmsView = serde_json::from_value(json).unwrap();
    assert_eq!(back, view);
}
