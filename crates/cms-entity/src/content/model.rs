//! Content (post/page) entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Kind of content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "content_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Blog post.
    Post,
    /// Static page.
    Page,
}

/// Publication status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "content_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    /// Publicly visible.
    Published,
    /// Work in progress.
    #[default]
    Draft,
    /// Visible to its author and editors only.
    Private,
}

impl ContentStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Draft => "draft",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored content item.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Content {
    /// Unique identifier.
    pub id: Uuid,
    /// Post or page.
    pub kind: ContentKind,
    /// Title.
    pub title: String,
    /// Body markup.
    pub content: String,
    /// Optional summary.
    pub excerpt: Option<String>,
    /// Publication status.
    pub status: ContentStatus,
    /// Author user id.
    pub author_id: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Category name.
    pub category: Option<String>,
    /// URL slug.
    pub slug: String,
    /// Fields contributed by plugins.
    pub extra: Value,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Host-owned keys of the post JSON. Everything else a hook adds lands in `extra`.
pub const CONTENT_FIELDS: &[&str] = &[
    "id",
    "kind",
    "title",
    "content",
    "excerpt",
    "status",
    "author_id",
    "tags",
    "category",
    "slug",
    "created_at",
    "updated_at",
];

/// Input for creating a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ContentDraft {
    /// Title.
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    /// Body markup.
    #[serde(default)]
    pub content: String,
    /// Optional summary.
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Publication status.
    #[serde(default)]
    pub status: ContentStatus,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Category.
    #[serde(default)]
    pub category: Option<String>,
    /// Explicit slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Any additional fields, passed through to hooks.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
