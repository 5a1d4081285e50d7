//! Storage traits consumed by the plugin and content layers.

pub mod memory;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use cms_core::result::AppResult;
use cms_entity::content::{Content, ContentKind, ContentStatus};
use cms_entity::plugin::{PluginRecord, PluginStatus};

/// Persistence for plugin records.
#[async_trait]
pub trait PluginStore: Send + Sync + std::fmt::Debug + 'static {
    /// All plugins ordered by install sequence.
    async fn find_all(&self) -> AppResult<Vec<PluginRecord>>;

    /// Find a plugin by id.
    async fn find_by_id(&self, id: &str) -> AppResult<Option<PluginRecord>>;

    /// Plugins with the given status, ordered by install sequence.
    async fn find_by_status(&self, status: PluginStatus) -> AppResult<Vec<PluginRecord>>;

    /// Insert a new record. Conflict if the id exists.
    async fn insert(&self, record: &PluginRecord) -> AppResult<()>;

    /// Write the status field. NotFound if the id is unknown.
    async fn update_status(&self, id: &str, status: PluginStatus) -> AppResult<()>;

    /// Replace the settings object. NotFound if the id is unknown.
    async fn update_settings(&self, id: &str, settings: &Value) -> AppResult<()>;

    /// Move a plugin to the end of the install order and return its new sequence.
    async fn bump_install_seq(&self, id: &str) -> AppResult<i64>;

    /// Next value of the install sequence.
    async fn next_install_seq(&self) -> AppResult<i64>;

    /// Delete a record. Returns whether it existed.
    async fn delete(&self, id: &str) -> AppResult<bool>;
}

/// Query options for listing content.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    /// Restrict to posts or pages.
    pub kind: Option<ContentKind>,
    /// Restrict to a status.
    pub status: Option<ContentStatus>,
    /// Restrict to one author.
    pub author_id: Option<String>,
    /// Maximum number of rows; `None` for all.
    pub limit: Option<i64>,
}

/// Aggregate counts backing the dashboard cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContentCounts {
    /// Number of posts.
    pub posts: i64,
    /// Number of pages.
    pub pages: i64,
    /// Number of published items.
    pub published: i64,
    /// Number of drafts.
    pub drafts: i64,
    /// Distinct authors.
    pub authors: i64,
}

/// Persistence for posts and pages.
#[async_trait]
pub trait ContentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a content item and return it as stored.
    async fn insert(&self, content: &Content) -> AppResult<Content>;

    /// Find a content item by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Content>>;

    /// List content, newest first.
    async fn list(&self, filter: &ContentFilter) -> AppResult<Vec<Content>>;

    /// Aggregate counts, optionally for a single author.
    async fn counts(&self, author_id: Option<&str>) -> AppResult<ContentCounts>;
}
