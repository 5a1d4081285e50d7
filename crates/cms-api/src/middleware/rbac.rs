//! Role guards for handlers.

use cms_core::error::AppError;
use cms_entity::user::UserRole;

use crate::extractors::AuthUser;

/// Checks that the caller is an admin.
pub fn require_admin(auth: &AuthUser) -> Result<(), AppError> {
    require_role(auth, UserRole::Admin)
}

/// Checks that the caller has at least `role`.
pub fn require_role(auth: &AuthUser, role: UserRole) -> Result<(), AppError> {
    if auth.role.has_at_least(&role) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!("{role} access required")))
    }
}
