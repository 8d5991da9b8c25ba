use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Field values of a single entity, keyed by property key.
pub type EntityValues = Map<String, Value>;

/// The stored data type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Timestamp,
    GeoPoint,
    Reference,
    Array,
    Map,
}

/// A static property definition.
///
/// Widget, validation and column settings are kept in `config` so the UI layer
/// can evolve them without touching the engine. Persisted per-user overrides are
/// deep-merged over the JSON form of this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, flatten)]
    pub config: Map<String, Value>,
}

impl Property {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            title: None,
            description: None,
            disabled: None,
            config: Map::new(),
        }
    }

    /// Shorthand for a string property.
    pub fn string() -> Self {
        Self::new(DataType::String)
    }

    /// Shorthand for a number property.
    pub fn number() -> Self {
        Self::new(DataType::Number)
    }

    /// Shorthand for a boolean property.
    pub fn boolean() -> Self {
        Self::new(DataType::Boolean)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }
}

/// Inputs available to a [`PropertyBuilder`].
#[derive(Debug, Clone, Copy)]
pub struct PropertyBuilderContext<'a> {
    pub path: &'a str,
    pub entity_id: Option<&'a str>,
    /// Candidate values of the entity, or the schema defaults when none were given.
    pub values: Option<&'a EntityValues>,
}

type PropertyBuilderFn = dyn Fn(&PropertyBuilderContext<'_>) -> Property + Send + Sync;

/// A property whose definition depends on the entity being edited
/// (e.g. a field that is disabled until a sibling field is set).
#[derive(Clone)]
pub struct PropertyBuilder(Arc<PropertyBuilderFn>);

impl PropertyBuilder {
    pub fn new<F>(builder: F) -> Self
    where
        F: Fn(&PropertyBuilderContext<'_>) -> Property + Send + Sync + 'static,
    {
        Self(Arc::new(builder))
    }

    pub fn build(&self, context: &PropertyBuilderContext<'_>) -> Property {
        (self.0)(context)
    }
}

impl fmt::Debug for PropertyBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PropertyBuilder(..)")
    }
}

/// A schema entry: either a static definition or a builder evaluated per entity.
#[derive(Debug, Clone)]
pub enum PropertyOrBuilder {
    Property(Property),
    Builder(PropertyBuilder),
}

impl From<Property> for PropertyOrBuilder {
    fn from(property: Property) -> Self {
        Self::Property(property)
    }
}

impl From<PropertyBuilder> for PropertyOrBuilder {
    fn from(builder: PropertyBuilder) -> Self {
        Self::Builder(builder)
    }
}

/// Describes the shape of the entities stored under a collection.
///
/// Property keys are unique; insertion order is the display order.
#[derive(Debug, Clone, Default)]
pub struct EntitySchema {
    pub name: String,
    pub description: Option<String>,
    pub properties: IndexMap<String, PropertyOrBuilder>,
    pub default_values: Option<EntityValues>,
}

impl EntitySchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds (or replaces) the property stored under `key`.
    pub fn with_property(mut self, key: impl Into<String>, property: impl Into<PropertyOrBuilder>) -> Self {
        self.properties.insert(key.into(), property.into());
        self
    }

    pub fn with_default_values(mut self, values: EntityValues) -> Self {
        self.default_values = Some(values);
        self
    }
}

/// Evaluates builder-typed properties against `(path, entity_id, values)`,
/// returning only static definitions in the original key order.
pub fn compute_properties(
    properties: &IndexMap<String, PropertyOrBuilder>,
    path: &str,
    entity_id: Option<&str>,
    values: Option<&EntityValues>,
) -> IndexMap<String, Property> {
    let context = PropertyBuilderContext {
        path,
        entity_id,
        values,
    };
    properties
        .iter()
        .map(|(key, entry)| {
            let property = match entry {
                PropertyOrBuilder::Property(property) => property.clone(),
                PropertyOrBuilder::Builder(builder) => builder.build(&context),
            };
            (key.clone(), property)
        })
        .collect()
}

/// A schema snapshot for one entity, with every builder evaluated and
/// persisted property overrides applied.
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    pub name: String,
    pub description: Option<String>,
    pub properties: IndexMap<String, Property>,
    pub default_values: Option<EntityValues>,
    /// The pristine schema this snapshot was computed from.
    pub original_schema: Arc<EntitySchema>,
}

/// Arguments of a [`SchemaResolver`] call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaResolverProps<'a> {
    pub entity_id: Option<&'a str>,
    pub values: Option<&'a EntityValues>,
}

type SchemaResolverFn = dyn Fn(SchemaResolverProps<'_>) -> ResolvedSchema + Send + Sync;

/// Computes the final schema of an entity from its id and current values.
#[derive(Clone)]
pub struct SchemaResolver(Arc<SchemaResolverFn>);

impl SchemaResolver {
    pub fn new<F>(resolver: F) -> Self
    where
        F: Fn(SchemaResolverProps<'_>) -> ResolvedSchema + Send + Sync + 'static,
    {
        Self(Arc::new(resolver))
    }

    pub fn resolve(&self, entity_id: Option<&str>, values: Option<&EntityValues>) -> ResolvedSchema {
        (self.0)(SchemaResolverProps { entity_id, values })
    }

    /// True if both handles point at the same resolver function.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SchemaResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SchemaResolver(..)")
    }
}
