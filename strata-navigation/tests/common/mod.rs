#![allow(dead_code)]

use serde_json::{Map, Value};
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use strata_model::{EntityCollection, EntitySchema, Permissions, Property};
use strata_navigation::{
    AuthController, ConfigurationPersistence, DataSource, NavigationConfig, NavigationContext,
    NavigationSource, PartialCollectionResolver, PersistedConfig, SchemaOverrideHandler,
    SchemaOverrideRequest, StorageSource, User,
};

pub const P0: Permissions = Permissions::all();
pub const P1: Permissions = Permissions::read_only();
pub const P2: Permissions = Permissions {
    read: true,
    create: true,
    edit: false,
    delete: false,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn obj(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

// ── Collaborators ────────────────────────────────────────────────

pub struct TestAuth {
    user: Mutex<Option<User>>,
    can_access: AtomicBool,
}

impl TestAuth {
    pub fn signed_in(uid: &str) -> Arc<Self> {
        Arc::new(Self {
            user: Mutex::new(Some(User::new(uid))),
            can_access: AtomicBool::new(true),
        })
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self {
            user: Mutex::new(None),
            can_access: AtomicBool::new(false),
        })
    }

    pub fn set_user(&self, user: Option<User>) {
        *self.user.lock().unwrap() = user;
    }

    pub fn set_access(&self, can_access: bool) {
        self.can_access.store(can_access, Ordering::SeqCst);
    }
}

impl AuthController for TestAuth {
    fn user(&self) -> Option<User> {
        self.user.lock().unwrap().clone()
    }

    fn can_access_main_view(&self) -> bool {
        self.can_access.load(Ordering::SeqCst)
    }
}

pub struct NoBackend;

impl DataSource for NoBackend {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl StorageSource for NoBackend {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Default)]
pub struct MemoryPersistence {
    configs: Mutex<HashMap<String, PersistedConfig>>,
}

impl MemoryPersistence {
    pub fn with(path: &str, config: Value) -> Arc<Self> {
        let persistence = Self::default();
        persistence
            .configs
            .lock()
            .unwrap()
            .insert(path.to_string(), obj(config));
        Arc::new(persistence)
    }

    pub fn stored(&self, path: &str) -> Option<PersistedConfig> {
        self.configs.lock().unwrap().get(path).cloned()
    }
}

impl ConfigurationPersistence for MemoryPersistence {
    fn get_collection_config(&self, path: &str) -> Option<PersistedConfig> {
        self.stored(path)
    }

    fn on_collection_modified(&self, path: &str, config: PersistedConfig) {
        self.configs.lock().unwrap().insert(path.to_string(), config);
    }
}

pub fn handler<F>(f: F) -> Arc<dyn SchemaOverrideHandler>
where
    F: Fn(SchemaOverrideRequest<'_>) -> Option<PartialCollectionResolver> + Send + Sync + 'static,
{
    Arc::new(f)
}

// ── Fixtures ─────────────────────────────────────────────────────

pub fn products_schema() -> EntitySchema {
    EntitySchema::new("Product")
        .with_property("name", Property::string())
        .with_property("price", Property::number())
}

pub fn products() -> EntityCollection {
    EntityCollection::new("products", "Products", products_schema())
        .with_permissions(P0)
        .with_setting("pagination", Value::Bool(true))
        .with_subcollection(EntityCollection::new(
            "locales",
            "Locales",
            EntitySchema::new("Locale").with_property("title", Property::string()),
        ))
}

pub fn named_navigation(name: &str) -> strata_model::Navigation {
    strata_model::Navigation::from(vec![EntityCollection::new(
        "products",
        name,
        products_schema(),
    )])
}

pub fn context(auth: Arc<TestAuth>, source: NavigationSource) -> NavigationContext {
    NavigationContext::new(
        NavigationConfig::default(),
        auth,
        source,
        Arc::new(NoBackend),
        Arc::new(NoBackend),
    )
}
