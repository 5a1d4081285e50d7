//! Menu and dashboard composition over the hook dispatcher.
//!
//! Composition strips presentation (icons), dispatches the minimal JSON
//! representation, then reattaches icons by a stable key. Entries a handler
//! introduces get a default icon.

pub mod auth;
pub mod dashboard;
pub mod icon;
pub mod menu;

pub use auth::{Authorizer, RoleAuthorizer};
pub use dashboard::{DashboardComposer, DashboardView, StatCard, StatItem};
pub use icon::Icon;
pub use menu::{MenuComposer, MenuEntry, MenuItem};
