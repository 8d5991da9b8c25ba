//! Host-provided collaborators the engine consumes but never inspects.

use serde::{Deserialize, Serialize};
use std::any::Any;

/// The signed-in principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
        }
    }
}

/// Authentication state of the current session.
pub trait AuthController: Send + Sync {
    /// The current principal, if anyone is signed in.
    fn user(&self) -> Option<User>;

    /// Whether the main view may be shown. Navigation is only loaded when true.
    fn can_access_main_view(&self) -> bool;

    /// Whether the auth provider is still initializing.
    fn auth_loading(&self) -> bool {
        false
    }
}

/// Handle to the backend data client, passed through to navigation builders.
pub trait DataSource: Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// Handle to the file storage client, passed through to navigation builders.
pub trait StorageSource: Send + Sync {
    fn as_any(&self) -> &dyn Any;
}
