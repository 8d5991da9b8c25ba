//! Navigation loading and layered collection resolution for Strata.
//!
//! # Architecture
//!
//! A [`NavigationContext`] is created per session. It loads the navigation tree
//! from a [`NavigationSource`] whenever the principal, the access flag or the
//! source changes, and resolves the collection shown by any view by layering:
//!
//! - the collection declared in the tree (or passed in directly)
//! - the persisted per-user configuration ([`ConfigurationPersistence`])
//! - the caller's [`SchemaOverrideHandler`]
//! - the transient override registered for the view ([`OverrideStore`])
//!
//! The result is a [`CollectionResolver`] whose schema is computed lazily per
//! entity by a [`SchemaResolver`](strata_model::SchemaResolver).
//!
//! # Example
//!
//! ```
//! use std::any::Any;
//! use std::sync::Arc;
//! use strata_model::{EntityCollection, EntitySchema, Property};
//! use strata_navigation::{
//!     AuthController, DataSource, NavigationConfig, NavigationContext, NavigationSource,
//!     StorageSource, User,
//! };
//!
//! struct Anonymous;
//! impl AuthController for Anonymous {
//!     fn user(&self) -> Option<User> { None }
//!     fn can_access_main_view(&self) -> bool { true }
//! }
//! struct Backend;
//! impl DataSource for Backend { fn as_any(&self) -> &dyn Any { self } }
//! impl StorageSource for Backend { fn as_any(&self) -> &dyn Any { self } }
//!
//! let products = EntityCollection::new(
//!     "products",
//!     "Products",
//!     EntitySchema::new("Product").with_property("name", Property::string()),
//! );
//! let context = NavigationContext::new(
//!     NavigationConfig::default(),
//!     Arc::new(Anonymous),
//!     NavigationSource::Collections(vec![products]),
//!     Arc::new(Backend),
//!     Arc::new(Backend),
//! );
//! assert_eq!(context.home_url(), "/");
//! ```

mod auth;
mod context;
mod error;
pub mod loader;
pub mod merge;
pub mod overrides;
pub mod path;
pub mod persistence;
pub mod resolver;
pub mod schema_resolver;
pub mod urls;

pub use auth::{AuthController, DataSource, StorageSource, User};
pub use context::{NavigationConfig, NavigationContext};
pub use error::{NavigationError, NavigationResult};
pub use loader::{
    LoadOutcome, LoadState, LoadStatus, NavigationBuilder, NavigationBuilderContext,
    NavigationSource, NavigationState,
};
pub use merge::merge_deep;
pub use overrides::{OverrideLookup, OverrideStore, TransientOverride, ViewRef};
pub use path::{canonicalize, find_collection, side_panel_key};
pub use persistence::{ConfigurationPersistence, PersistedConfig, PersistedConfigAdapter};
pub use resolver::{
    CollectionResolver, PartialCollectionResolver, Resolver, SchemaOverrideHandler,
    SchemaOverrideRequest,
};
pub use schema_resolver::build_schema_resolver;
pub use urls::CmsUrls;
