//! Plugin repository implementation.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;

use cms_core::error::{AppError, ErrorKind};
use cms_core::result::AppResult;
use cms_entity::plugin::{PluginRecord, PluginStatus};

use crate::store::PluginStore;

/// Repository for plugin records.
#[derive(Debug, Clone)]
pub struct PluginRepository {
    pool: PgPool,
}

impl PluginRepository {
    /// Create a new plugin repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn expect_row(rows: u64, id: &str) -> AppResult<()> {
    if rows == 0 {
        return Err(AppError::not_found(format!("Plugin '{id}' not found")));
    }
    Ok(())
}

#[async_trait]
impl PluginStore for PluginRepository {
    async fn find_all(&self) -> AppResult<Vec<PluginRecord>> {
        sqlx::query_as::<_, PluginRecord>("SELECT * FROM plugins ORDER BY install_seq, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list plugins", e))
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<PluginRecord>> {
        sqlx::query_as::<_, PluginRecord>("SELECT * FROM plugins WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find plugin", e))
    }

    async fn find_by_status(&self, status: PluginStatus) -> AppResult<Vec<PluginRecord>> {
        sqlx::query_as::<_, PluginRecord>(
            "SELECT * FROM plugins WHERE status = $1 ORDER BY install_seq, id",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list plugins by status", e)
        })
    }

    async fn insert(&self, record: &PluginRecord) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO plugins (id, name, description, version, author, category, price, icon, \
             status, features, dependencies, hooks, settings, settings_schema, install_seq, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.description)
        .bind(&record.version)
        .bind(&record.author)
        .bind(&record.category)
        .bind(&record.price)
        .bind(&record.icon)
        .bind(record.status)
        .bind(&record.features)
        .bind(&record.dependencies)
        .bind(Json(&record.hooks))
        .bind(&record.settings)
        .bind(&record.settings_schema)
        .bind(record.install_seq)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => {
                AppError::conflict(format!("Plugin '{}' already exists", record.id))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to insert plugin", e),
        })?;
        Ok(())
    }

    async fn update_status(&self, id: &str, status: PluginStatus) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE plugins SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update plugin status", e)
                })?;
        expect_row(result.rows_affected(), id)
    }

    async fn update_settings(&self, id: &str, settings: &Value) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE plugins SET settings = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(settings)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Database,
                        "Failed to update plugin settings",
                        e,
                    )
                })?;
        expect_row(result.rows_affected(), id)
    }

    async fn bump_install_seq(&self, id: &str) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE plugins SET install_seq = nextval('plugin_install_seq'), updated_at = NOW() \
             WHERE id = $1 RETURNING install_seq",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to bump install seq", e))?
        .ok_or_else(|| AppError::not_found(format!("Plugin '{id}' not found")))
    }

    async fn next_install_seq(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT nextval('plugin_install_seq')")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to allocate install seq", e)
            })
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM plugins WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete plugin", e))?;
        Ok(result.rows_affected() > 0)
    }
}
