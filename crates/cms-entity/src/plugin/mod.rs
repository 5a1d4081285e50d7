//! Plugin domain entities.

pub mod hook;
pub mod manifest;
pub mod model;

pub use hook::{HookBinding, HookDefinition, HookMap, HookSide, ManifestAction};
pub use manifest::PluginManifest;
pub use model::{PluginRecord, PluginStatus};
