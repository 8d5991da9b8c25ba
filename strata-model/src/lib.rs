//! Collection and schema model for Strata.
//!
//! Defines the types the navigation engine and the UI layer share:
//! - [`EntityCollection`]: a navigable node (path, schema, subcollections, permissions)
//! - [`Navigation`]: the ordered top-level collections plus custom [`CmsView`]s
//! - [`EntitySchema`]: keyed property definitions, static or built from entity values
//! - [`ResolvedSchema`] / [`SchemaResolver`]: the finalized per-entity schema snapshot
//! - [`EntityCallbacks`]: optional lifecycle hooks, opaque to the engine
//!
//! Everything that may be persisted as a per-user override is serde-serializable;
//! functions (property builders, schema resolvers, callbacks) are carried behind `Arc`.

mod collection;
mod schema;

pub use collection::{CmsView, EntityCallbacks, EntityCollection, Navigation, Permissions};
pub use schema::{
    compute_properties, DataType, EntitySchema, EntityValues, Property, PropertyBuilder,
    PropertyBuilderContext, PropertyOrBuilder, ResolvedSchema, SchemaResolver,
    SchemaResolverProps,
};
