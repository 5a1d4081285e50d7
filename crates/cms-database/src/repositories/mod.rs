//! PostgreSQL repository implementations.

pub mod content;
pub mod plugin;

pub use content::ContentRepository;
pub use plugin::PluginRepository;
