//! The session-scoped navigation context.
//!
//! One context exists per authenticated session. It owns the loaded tree, the
//! transient override store and the collaborators, and exposes the resolution
//! and URL helpers the UI layer consumes. The tree is replaced wholesale on
//! reload and never mutated by resolution.

use crate::auth::{AuthController, DataSource, StorageSource};
use crate::error::{NavigationError, NavigationResult};
use crate::loader::{
    resolve_source, LoadFingerprint, LoadOutcome, LoadState, LoadStatus, NavigationBuilderContext,
    NavigationSource, NavigationState,
};
use crate::overrides::{OverrideStore, ViewRef};
use crate::persistence::{ConfigurationPersistence, PersistedConfig, PersistedConfigAdapter};
use crate::resolver::{
    CollectionResolver, PartialCollectionResolver, Resolver, SchemaOverrideHandler,
};
use crate::urls::CmsUrls;
use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use std::sync::Arc;
use strata_model::{EntityCollection, Navigation};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Configuration for the navigation context.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// URL prefix of the whole application.
    pub base_path: String,
    /// URL segment of the collection area, below `base_path`.
    pub base_collection_path: String,
    /// Passed to navigation builders.
    pub date_time_format: Option<String>,
    /// Passed to navigation builders.
    pub locale: Option<String>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            base_collection_path: "c".to_string(),
            date_time_format: None,
            locale: None,
        }
    }
}

struct SourceSlot {
    source: Arc<NavigationSource>,
    revision: u64,
}

/// Navigation and collection resolution for one session.
pub struct NavigationContext {
    config: NavigationConfig,
    urls: CmsUrls,
    auth: Arc<dyn AuthController>,
    data_source: Arc<dyn DataSource>,
    storage_source: Arc<dyn StorageSource>,
    source: RwLock<SourceSlot>,
    schema_override_handler: Option<Arc<dyn SchemaOverrideHandler>>,
    persisted: PersistedConfigAdapter,
    state: RwLock<NavigationState>,
    overrides: Mutex<OverrideStore>,
    status: watch::Sender<LoadStatus>,
}

impl NavigationContext {
    /// Creates a context. Nothing is loaded until [`sync`](Self::sync) is called.
    pub fn new(
        config: NavigationConfig,
        auth: Arc<dyn AuthController>,
        source: NavigationSource,
        data_source: Arc<dyn DataSource>,
        storage_source: Arc<dyn StorageSource>,
    ) -> Self {
        let urls = CmsUrls::new(&config.base_path, &config.base_collection_path);
        let (status, _) = watch::channel(LoadStatus::default());
        Self {
            config,
            urls,
            auth,
            data_source,
            storage_source,
            source: RwLock::new(SourceSlot {
                source: Arc::new(source),
                revision: 0,
            }),
            schema_override_handler: None,
            persisted: PersistedConfigAdapter::disabled(),
            state: RwLock::new(NavigationState::new()),
            overrides: Mutex::new(OverrideStore::new()),
            status,
        }
    }

    /// Sets the handler consulted on every collection resolution.
    pub fn with_schema_override_handler(mut self, handler: Arc<dyn SchemaOverrideHandler>) -> Self {
        self.schema_override_handler = Some(handler);
        self
    }

    /// Sets the store of persisted per-user collection configuration.
    pub fn with_persistence(mut self, persistence: Arc<dyn ConfigurationPersistence>) -> Self {
        self.persisted = PersistedConfigAdapter::new(persistence);
        self
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn auth(&self) -> &Arc<dyn AuthController> {
        &self.auth
    }

    // ── Navigation state ─────────────────────────────────────────

    /// The current tree; `None` until the first successful load.
    pub fn navigation(&self) -> Option<Arc<Navigation>> {
        self.state.read().navigation()
    }

    pub fn loading(&self) -> bool {
        self.state.read().is_loading()
    }

    pub fn load_state(&self) -> LoadState {
        self.state.read().state()
    }

    /// The error of the latest load, if it failed.
    pub fn navigation_loading_error(&self) -> Option<Arc<NavigationError>> {
        self.state.read().error()
    }

    /// Whether a tree has ever been stored.
    pub fn initialised(&self) -> bool {
        self.state.read().navigation().is_some()
    }

    pub fn generation(&self) -> u64 {
        self.state.read().generation()
    }

    /// Receives a [`LoadStatus`] every time the loader state changes.
    pub fn subscribe(&self) -> watch::Receiver<LoadStatus> {
        self.status.subscribe()
    }

    /// Replaces the navigation source. The next [`sync`](Self::sync) reloads.
    pub fn set_navigation_source(&self, source: NavigationSource) {
        let mut slot = self.source.write();
        slot.source = Arc::new(source);
        slot.revision += 1;
    }

    /// Loads the tree if the principal, the access flag or the source changed
    /// since the last call.
    pub async fn sync(&self) -> LoadOutcome {
        self.load(false).await
    }

    /// Loads the tree even if nothing changed.
    pub async fn reload(&self) -> LoadOutcome {
        self.load(true).await
    }

    async fn load(&self, force: bool) -> LoadOutcome {
        let (source, source_revision) = {
            let slot = self.source.read();
            (Arc::clone(&slot.source), slot.revision)
        };
        let user = self.auth.user();
        let can_access = self.auth.can_access_main_view();
        let fingerprint = LoadFingerprint {
            user: user.as_ref().map(|user| user.uid.clone()),
            can_access,
            source_revision,
        };

        let generation = {
            let mut state = self.state.write();
            if !can_access {
                debug!("main view not accessible, skipping navigation load");
                state.observe(fingerprint);
                return LoadOutcome::Skipped;
            }
            if !force && !state.needs_load(&fingerprint) {
                return LoadOutcome::Unchanged;
            }
            state.begin(fingerprint)
        };
        self.publish();
        info!(generation, ?source, "loading navigation");

        let context = NavigationBuilderContext {
            user,
            auth: Arc::clone(&self.auth),
            date_time_format: self.config.date_time_format.clone(),
            locale: self.config.locale.clone(),
            data_source: Arc::clone(&self.data_source),
            storage_source: Arc::clone(&self.storage_source),
        };
        let result = resolve_source(&source, context).await;

        let outcome = self.state.write().complete(generation, result);
        match outcome {
            LoadOutcome::Loaded => info!(generation, "navigation loaded"),
            LoadOutcome::Failed => {
                if let Some(e) = self.navigation_loading_error() {
                    warn!(generation, error = %e, "navigation load failed");
                }
            }
            LoadOutcome::Superseded => {
                debug!(generation, latest = self.generation(), "discarding stale navigation load")
            }
            LoadOutcome::Skipped | LoadOutcome::Unchanged => {}
        }
        self.publish();
        outcome
    }

    fn publish(&self) {
        let status = self.state.read().status();
        self.status.send_replace(status);
    }

    // ── Resolution ───────────────────────────────────────────────

    /// Resolves the collection shown at `path` (and `entity_id`).
    ///
    /// `collection` replaces the tree lookup when given.
    pub fn get_collection_resolver(
        &self,
        path: &str,
        entity_id: Option<&str>,
        collection: Option<&EntityCollection>,
    ) -> NavigationResult<CollectionResolver> {
        let navigation = self.navigation();
        Resolver {
            navigation: navigation.as_deref(),
            overrides: &self.overrides,
            handler: self.schema_override_handler.as_deref(),
            persisted: &self.persisted,
        }
        .resolve(path, entity_id, collection)
    }

    /// Registers a transient override for a view and returns its side-panel key.
    /// Passing `None` removes the override.
    pub fn set_override(
        &self,
        path: &str,
        entity_id: Option<&str>,
        config: Option<PartialCollectionResolver>,
        override_schema_registry: Option<bool>,
    ) -> Option<String> {
        self.overrides
            .lock()
            .set(path, entity_id, config, override_schema_registry)
    }

    pub fn remove_override(&self, path: &str, entity_id: Option<&str>) {
        self.overrides.lock().remove(path, entity_id);
    }

    /// Drops the overrides of every view not listed in `keep`.
    pub fn remove_all_overrides_except(&self, keep: &[ViewRef]) {
        self.overrides.lock().prune_except(keep);
    }

    /// Side-panel keys with a registered override.
    pub fn override_keys(&self) -> Vec<String> {
        self.overrides.lock().keys().map(str::to_string).collect()
    }

    /// Persists a user edit of a collection's configuration.
    pub fn on_collection_modified(&self, path: &str, partial: &PersistedConfig) {
        self.persisted.record_modification(path, partial);
    }

    // ── URLs ─────────────────────────────────────────────────────

    pub fn home_url(&self) -> &str {
        self.urls.home_url()
    }

    pub fn base_path(&self) -> &str {
        &self.config.base_path
    }

    pub fn base_collection_path(&self) -> &str {
        &self.config.base_collection_path
    }

    pub fn is_url_collection_path(&self, url: &str) -> bool {
        self.urls.is_url_collection_path(url)
    }

    pub fn url_path_to_data_path(&self, url: &str) -> NavigationResult<String> {
        self.urls.url_path_to_data_path(url)
    }

    pub fn build_url_collection_path(&self, path: &str) -> String {
        self.urls.build_url_collection_path(path)
    }

    pub fn build_cms_url_path(&self, path: &str) -> String {
        self.urls.build_cms_url_path(path)
    }
}
