//! # cms-database
//!
//! Persistence for plugin records and content. Each store is a trait with a
//! PostgreSQL repository and an in-memory implementation; the server picks
//! one at startup depending on whether `database.url` is set.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use repositories::{ContentRepository, PluginRepository};
pub use store::memory::{InMemoryContentStore, InMemoryPluginStore};
pub use store::{ContentCounts, ContentFilter, ContentStore, PluginStore};
