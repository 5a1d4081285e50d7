//! Authenticated caller identity.

use serde::{Deserialize, Serialize};

use super::role::UserRole;

/// The user on whose behalf a request runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    /// User identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role at the time the token was issued.
    pub role: UserRole,
}

impl UserContext {
    /// Creates a new user context.
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    /// Compact JSON form handed to hook handlers as `currentUser`.
    pub fn to_hook_value(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "role": self.role.as_str(),
        })
    }
}
