//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available to admin-panel users.
///
/// Roles are ordered by privilege level: Admin > Editor > Author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full site administrator. Manages plugins, users and settings.
    Admin,
    /// Manages all content.
    Editor,
    /// Writes and manages their own content.
    Author,
}

impl UserRole {
    /// Return the privilege level (higher = more privileged).
    pub fn privilege_level(&self) -> u8 {
        match self {
            Self::Admin => 3,
            Self::Editor => 2,
            Self::Author => 1,
        }
    }

    /// Check if this role has at least the given role's privileges.
    pub fn has_at_least(&self, other: &UserRole) -> bool {
        self.privilege_level() >= other.privilege_level()
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Check if this role is an editor or higher.
    pub fn is_editor_or_above(&self) -> bool {
        self.has_at_least(&Self::Editor)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Author => "author",
        }
    }

    /// All roles, most privileged first.
    pub fn all() -> [UserRole; 3] {
        [Self::Admin, Self::Editor, Self::Author]
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = cms_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "author" => Ok(Self::Author),
            _ => Err(cms_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, editor, author"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_ordering() {
        assert!(UserRole::Admin.has_at_least(&UserRole::Editor));
        assert!(UserRole::Editor.has_at_least(&UserRole::Author));
        assert!(!UserRole::Author.has_at_least(&UserRole::Editor));
        assert!(UserRole::Editor.is_editor_or_above());
        assert!(!UserRole::Author.is_editor_or_above());
    }

    #[test]
    fn test_parse_role() {
        assert_eq!("Editor".parse::<UserRole>().unwrap(), UserRole::Editor);
        assert!("viewer".parse::<UserRole>().is_err());
    }
}
