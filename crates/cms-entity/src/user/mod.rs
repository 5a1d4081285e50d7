//! User domain entities.

pub mod context;
pub mod role;

pub use context::UserContext;
pub use role::UserRole;
