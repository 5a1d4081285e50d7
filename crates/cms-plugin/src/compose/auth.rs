//! Role checks used to filter composed menus.

use std::str::FromStr;

use cms_entity::user::{UserContext, UserRole};

/// Decides whether a user holds a role named by a menu entry.
pub trait Authorizer: Send + Sync + std::fmt::Debug {
    /// Whether `user` has `role`.
    fn has_role(&self, user: &UserContext, role: &str) -> bool;
}

/// Exact role match. Unknown role names never match.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoleAuthorizer;

impl Authorizer for RoleAuthorizer {
    fn has_role(&self, user: &UserContext, role: &str) -> bool {
        UserRole::from_str(role).is_ok_and(|r| r == user.role)
    }
}
