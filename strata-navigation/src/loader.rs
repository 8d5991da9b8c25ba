//! Navigation loading state machine.
//!
//! Each load attempt is tagged with a generation. Only the result of the
//! latest generation is stored; results of superseded attempts are dropped,
//! so completion order never matters.

use crate::auth::{AuthController, DataSource, StorageSource, User};
use crate::error::{NavigationError, NavigationResult};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use strata_model::{EntityCollection, Navigation};

/// Everything a [`NavigationBuilder`] may use to build the tree.
#[derive(Clone)]
pub struct NavigationBuilderContext {
    pub user: Option<User>,
    pub auth: Arc<dyn AuthController>,
    pub date_time_format: Option<String>,
    pub locale: Option<String>,
    pub data_source: Arc<dyn DataSource>,
    pub storage_source: Arc<dyn StorageSource>,
}

/// Builds the navigation tree for the current principal.
#[async_trait]
pub trait NavigationBuilder: Send + Sync {
    async fn build(&self, context: NavigationBuilderContext) -> anyhow::Result<Navigation>;
}

/// Where the navigation tree comes from.
#[derive(Clone)]
pub enum NavigationSource {
    /// A fixed list of top-level collections.
    Collections(Vec<EntityCollection>),
    /// Built asynchronously on every load.
    Builder(Arc<dyn NavigationBuilder>),
    /// A fixed tree.
    Navigation(Navigation),
}

impl fmt::Debug for NavigationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collections(collections) => f
                .debug_tuple("Collections")
                .field(&collections.len())
                .finish(),
            Self::Builder(_) => f.write_str("Builder(..)"),
            Self::Navigation(navigation) => f
                .debug_tuple("Navigation")
                .field(&navigation.collections.len())
                .finish(),
        }
    }
}

/// Resolves `source` into a concrete tree.
pub async fn resolve_source(
    source: &NavigationSource,
    context: NavigationBuilderContext,
) -> NavigationResult<Navigation> {
    match source {
        NavigationSource::Collections(collections) => Ok(Navigation::from(collections.clone())),
        NavigationSource::Navigation(navigation) => Ok(navigation.clone()),
        NavigationSource::Builder(builder) => builder
            .build(context)
            .await
            .map_err(|e| NavigationError::NavigationLoad(format!("{e:#}"))),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing loaded yet, or access is not granted.
    #[default]
    Idle,
    Loading,
    Loaded,
    /// The latest load failed; the previous tree, if any, is kept.
    Failed,
}

/// How a load request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Access to the main view is not granted.
    Skipped,
    /// The dependency set did not change since the last load.
    Unchanged,
    Loaded,
    Failed,
    /// A newer load started before this one finished; its result was dropped.
    Superseded,
}

/// Snapshot published to subscribers whenever the loader state changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStatus {
    pub state: LoadState,
    pub generation: u64,
}

/// The dependency set whose change triggers a reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFingerprint {
    pub user: Option<String>,
    pub can_access: bool,
    pub source_revision: u64,
}

/// Session-scoped loader state. Only mutated through its transition methods.
#[derive(Debug, Default)]
pub struct NavigationState {
    navigation: Option<Arc<Navigation>>,
    state: LoadState,
    error: Option<Arc<NavigationError>>,
    generation: u64,
    last_fingerprint: Option<LoadFingerprint>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigation(&self) -> Option<Arc<Navigation>> {
        self.navigation.clone()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn error(&self) -> Option<Arc<NavigationError>> {
        self.error.clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> LoadStatus {
        LoadStatus {
            state: self.state,
            generation: self.generation,
        }
    }

    /// True if `fingerprint` differs from the last one observed.
    pub fn needs_load(&self, fingerprint: &LoadFingerprint) -> bool {
        self.last_fingerprint.as_ref() != Some(fingerprint)
    }

    /// Records a dependency set without loading (access not granted).
    pub fn observe(&mut self, fingerprint: LoadFingerprint) {
        self.last_fingerprint = Some(fingerprint);
    }

    /// Starts a new generation and returns its tag.
    pub fn begin(&mut self, fingerprint: LoadFingerprint) -> u64 {
        self.generation += 1;
        self.state = LoadState::Loading;
        self.last_fingerprint = Some(fingerprint);
        self.generation
    }

    /// Stores the result of `generation` unless a newer generation has started.
    pub fn complete(
        &mut self,
        generation: u64,
        result: NavigationResult<Navigation>,
    ) -> LoadOutcome {
        if generation != self.generation {
            return LoadOutcome::Superseded;
        }
        match result {
            Ok(navigation) => {
                self.navigation = Some(Arc::new(navigation));
                self.error = None;
                self.state = LoadState::Loaded;
                LoadOutcome::Loaded
            }
            Err(e) => {
                self.error = Some(Arc::new(e));
                self.state = LoadState::Failed;
                LoadOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(user: &str) -> LoadFingerprint {
        LoadFingerprint {
            user: Some(user.into()),
            can_access: true,
            source_revision: 0,
        }
    }

    #[test]
    fn stale_generation_is_discarded() {
        let mut state = NavigationState::new();
        let first = state.begin(fingerprint("a"));
        let second = state.begin(fingerprint("b"));

        assert_eq!(state.complete(second, Ok(Navigation::default())), LoadOutcome::Loaded);
        assert_eq!(
            state.complete(first, Err(NavigationError::NavigationLoad("late".into()))),
            LoadOutcome::Superseded
        );
        assert_eq!(state.state(), LoadState::Loaded);
        assert!(state.error().is_none());
    }

    #[test]
    fn failure_keeps_previous_tree() {
        let mut state = NavigationState::new();
        let g = state.begin(fingerprint("a"));
        state.complete(g, Ok(Navigation::default()));

        let g = state.begin(fingerprint("b"));
        assert!(state.is_loading());
        state.complete(g, Err(NavigationError::NavigationLoad("boom".into())));

        assert_eq!(state.state(), LoadState::Failed);
        assert!(!state.is_loading());
        assert!(state.navigation().is_some());
        assert!(state.error().is_some());
    }

    #[test]
    fn fingerprint_change_detection() {
        let mut state = NavigationState::new();
        assert!(state.needs_load(&fingerprint("a")));
        state.begin(fingerprint("a"));
        assert!(!state.needs_load(&fingerprint("a")));
        assert!(state.needs_load(&fingerprint("b")));
    }
}
