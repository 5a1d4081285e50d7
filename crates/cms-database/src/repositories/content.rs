//! Content repository implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use cms_core::error::{AppError, ErrorKind};
use cms_core::result::AppResult;
use cms_entity::content::Content;

use crate::store::{ContentCounts, ContentFilter, ContentStore};

/// Repository for posts and pages.
#[derive(Debug, Clone)]
pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    /// Create a new content repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for ContentRepository {
    async fn insert(&self, content: &Content) -> AppResult<Content> {
        sqlx::query_as::<_, Content>(
            "INSERT INTO content (id, kind, title, content, excerpt, status, author_id, tags, \
             category, slug, extra, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *",
        )
        .bind(content.id)
        .bind(content.kind)
        .bind(&content.title)
        .bind(&content.content)
        .bind(&content.excerpt)
        .bind(content.status)
        .bind(&content.author_id)
        .bind(&content.tags)
        .bind(&content.category)
        .bind(&content.slug)
        .bind(&content.extra)
        .bind(content.created_at)
        .bind(content.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert content", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Content>> {
        sqlx::query_as::<_, Content>("SELECT * FROM content WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find content", e))
    }

    async fn list(&self, filter: &ContentFilter) -> AppResult<Vec<Content>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM content WHERE TRUE");
        if let Some(kind) = filter.kind {
            query.push(" AND kind = ").push_bind(kind);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(author) = &filter.author_id {
            query.push(" AND author_id = ").push_bind(author.clone());
        }
        query.push(" ORDER BY created_at DESC, id");
        if let Some(limit) = filter.limit {
            query.push(" LIMIT ").push_bind(limit.max(0));
        }

        query
            .build_query_as::<Content>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list content", e))
    }

    async fn counts(&self, author_id: Option<&str>) -> AppResult<ContentCounts> {
        let row: (i64, i64, i64, i64, i64) = sqlx::query_as(
            "SELECT \
                COUNT(*) FILTER (WHERE kind = 'post'), \
                COUNT(*) FILTER (WHERE kind = 'page'), \
                COUNT(*) FILTER (WHERE status = 'published'), \
                COUNT(*) FILTER (WHERE status = 'draft'), \
                COUNT(DISTINCT author_id) \
             FROM content WHERE ($1::TEXT IS NULL OR author_id = $1)",
        )
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count content", e))?;

        Ok(ContentCounts {
            posts: row.0,
            pages: row.1,
            published: row.2,
            drafts: row.3,
            authors: row.4,
        })
    }
}
