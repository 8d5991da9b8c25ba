//! Error types for the navigation layer.

use thiserror::Error;

/// Result type for navigation operations.
pub type NavigationResult<T> = Result<T, NavigationError>;

/// Errors that can occur while loading navigation or resolving collections.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// No layer produced a schema for the requested view.
    #[error("not able to resolve schema for {key}")]
    SchemaUnresolved { key: String },

    /// The navigation builder failed.
    #[error("navigation load failed: {0}")]
    NavigationLoad(String),

    /// A URL outside the collection area was given where a data path was expected.
    #[error("expected path starting with {expected_prefix}, got {path}")]
    InvalidUrlPath {
        path: String,
        expected_prefix: String,
    },
}
