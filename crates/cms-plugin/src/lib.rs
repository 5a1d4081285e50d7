//! # cms-plugin
//!
//! Plugin framework for CMS Pro. Provides:
//!
//! - Plugin registry over a persistent store, with compiled-in modules
//! - Hook registry with `(order, install sequence)` ordering
//! - Local and remote hook dispatchers with fail-open handler isolation
//! - Activation manager keeping registrations in step with plugin status
//! - Menu and dashboard composition

pub mod catalog;
pub mod compose;
pub mod handlers;
pub mod hooks;
pub mod loader;
pub mod manager;
pub mod modules;
pub mod registry;
pub mod traits;

pub use compose::{DashboardComposer, MenuComposer};
pub use hooks::definitions::{DispatchOutcome, HookAction, HookPoint};
pub use hooks::dispatcher::{Dispatcher, LocalDispatcher};
pub use hooks::registry::{HookHandler, HookRegistry};
pub use hooks::remote::RemoteDispatcher;
pub use manager::PluginManager;
pub use registry::PluginRegistry;
pub use traits::{ClosureHandler, PluginModule};
