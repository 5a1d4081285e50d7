//! In-memory stores, used when no database is configured and in tests.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use cms_core::error::AppError;
use cms_core::result::AppResult;
use cms_entity::content::{Content, ContentKind, ContentStatus};
use cms_entity::plugin::{PluginRecord, PluginStatus};

use super::{ContentCounts, ContentFilter, ContentStore, PluginStore};

/// Plugin records held in a map.
#[derive(Debug, Default)]
pub struct InMemoryPluginStore {
    records: RwLock<HashMap<String, PluginRecord>>,
    seq: AtomicI64,
}

impl InMemoryPluginStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted(mut records: Vec<PluginRecord>) -> Vec<PluginRecord> {
    records.sort_by(|a, b| a.install_seq.cmp(&b.install_seq).then_with(|| a.id.cmp(&b.id)));
    records
}

fn plugin_not_found(id: &str) -> AppError {
    AppError::not_found(format!("Plugin '{id}' not found"))
}

#[async_trait]
impl PluginStore for InMemoryPluginStore {
    async fn find_all(&self) -> AppResult<Vec<PluginRecord>> {
        let records = self.records.read().await;
        Ok(sorted(records.values().cloned().collect()))
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<PluginRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_by_status(&self, status: PluginStatus) -> AppResult<Vec<PluginRecord>> {
        let records = self.records.read().await;
        Ok(sorted(
            records
                .values()
                .filter(|r| r.status == status)
                .cloned()
                .collect(),
        ))
    }

    async fn insert(&self, record: &PluginRecord) -> AppResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(AppError::conflict(format!(
                "Plugin '{}' already exists",
                record.id
            )));
        }
        self.seq.fetch_max(record.install_seq, Ordering::SeqCst);
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn update_status(&self, id: &str, status: PluginStatus) -> AppResult<()> {
        let mut records = self.records.write().await;
        let record = records.get_mut(id).ok_or_else(|| plugin_not_found(id))?;
        record.status = status;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn update_settings(&self, id: &str, settings: &Value) -> AppResult<()> {
        let mut records = self.records.write().await;
        let record = records.get_mut(id).ok_or_else(|| plugin_not_found(id))?;
        record.settings = settings.clone();
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn bump_install_seq(&self, id: &str) -> AppResult<i64> {
        let mut records = self.records.write().await;
        let record = records.get_mut(id).ok_or_else(|| plugin_not_found(id))?;
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        record.install_seq = seq;
        record.updated_at = Utc::now();
        Ok(seq)
    }

    async fn next_install_seq(&self) -> AppResult<i64> {
        Ok(self.seq.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        Ok(self.records.write().await.remove(id).is_some())
    }
}

/// Content items held in a map.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    items: RwLock<HashMap<Uuid, Content>>,
}

impl InMemoryContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn insert(&self, content: &Content) -> AppResult<Content> {
        let mut items = self.items.write().await;
        if items.contains_key(&content.id) {
            return Err(AppError::conflict(format!(
                "Content '{}' already exists",
                content.id
            )));
        }
        items.insert(content.id, content.clone());
        Ok(content.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Content>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: &ContentFilter) -> AppResult<Vec<Content>> {
        let items = self.items.read().await;
        let mut matched: Vec<Content> = items
            .values()
            .filter(|c| filter.kind.is_none_or(|k| c.kind == k))
            .filter(|c| filter.status.is_none_or(|s| c.status == s))
            .filter(|c| {
                filter
                    .author_id
                    .as_deref()
                    .is_none_or(|a| c.author_id == a)
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        if let Some(limit) = filter.limit {
            matched.truncate(limit.max(0) as usize);
        }
        Ok(matched)
    }

    async fn counts(&self, author_id: Option<&str>) -> AppResult<ContentCounts> {
        let items = self.items.read().await;
        let mut counts = ContentCounts::default();
        let mut authors = HashSet::new();
        for item in items
            .values()
            .filter(|c| author_id.is_none_or(|a| c.author_id == a))
        {
            match item.kind {
                ContentKind::Post => counts.posts += 1,
                ContentKind::Page => counts.pages += 1,
            }
            match item.status {
                ContentStatus::Published => counts.published += 1,
                ContentStatus::Draft => counts.drafts += 1,
                ContentStatus::Private => {}
            }
            authors.insert(item.author_id.as_str());
        }
        counts.authors = authors.len() as i64;
        Ok(counts)
    }
}
