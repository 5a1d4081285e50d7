//! Hook registry: handlers by hook point, ordered by `(order, sequence, insertion)`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use cms_core::result::AppResult;

use super::definitions::{HookAction, HookPoint};

/// Trait for hook handler implementations.
#[async_trait]
pub trait HookHandler: Send + Sync + std::fmt::Debug {
    /// Handles a hook invocation.
    async fn handle(&self, payload: &Value) -> AppResult<HookAction>;
}

/// A handler waiting to be registered for one hook.
#[derive(Debug, Clone)]
pub struct HookRegistration {
    /// Hook the handler binds to.
    pub hook: HookPoint,
    /// The handler.
    pub handler: Arc<dyn HookHandler>,
    /// Ascending priority.
    pub order: i32,
}

impl HookRegistration {
    /// Creates a registration.
    pub fn new(hook: HookPoint, handler: Arc<dyn HookHandler>, order: i32) -> Self {
        Self {
            hook,
            handler,
            order,
        }
    }
}

/// Entry in the hook registry.
#[derive(Debug, Clone)]
pub struct HookEntry {
    /// Plugin that registered this handler.
    pub plugin_id: String,
    /// The handler.
    pub handler: Arc<dyn HookHandler>,
    /// Priority (lower runs first).
    pub order: i32,
    /// Plugin install sequence, breaks ties between plugins.
    pub sequence: i64,
    /// Registration counter, breaks ties within a plugin.
    inserted: u64,
}

impl HookEntry {
    fn sort_key(&self) -> (i32, i64, u64) {
        (self.order, self.sequence, self.inserted)
    }
}

#[derive(Debug, Default)]
struct Table {
    hooks: HashMap<HookPoint, Vec<HookEntry>>,
    sequences: HashMap<String, i64>,
    inserted: u64,
}

impl Table {
    fn sequence_for(&mut self, plugin_id: &str) -> i64 {
        if let Some(seq) = self.sequences.get(plugin_id) {
            return *seq;
        }
        let next = self.sequences.values().copied().max().unwrap_or(0) + 1;
        self.sequences.insert(plugin_id.to_string(), next);
        next
    }

    fn push(&mut self, plugin_id: &str, sequence: i64, registration: HookRegistration) {
        self.inserted += 1;
        let entries = self.hooks.entry(registration.hook).or_default();
        entries.push(HookEntry {
            plugin_id: plugin_id.to_string(),
            handler: registration.handler,
            order: registration.order,
            sequence,
            inserted: self.inserted,
        });
        entries.sort_by_key(HookEntry::sort_key);
    }

    fn remove(&mut self, plugin_id: &str) -> usize {
        let mut removed = 0;
        for entries in self.hooks.values_mut() {
            let before = entries.len();
            entries.retain(|e| e.plugin_id != plugin_id);
            removed += before - entries.len();
        }
        self.hooks.retain(|_, entries| !entries.is_empty());
        self.sequences.remove(plugin_id);
        removed
    }
}

/// Registry of hook handlers organized by hook point.
///
/// All mutation happens under one write lock, so a dispatch snapshot sees a
/// plugin either fully registered or not at all.
#[derive(Debug, Default)]
pub struct HookRegistry {
    table: RwLock<Table>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a single handler. Plugins registering for the first time
    /// are ranked after every plugin already present.
    pub async fn register(
        &self,
        plugin_id: &str,
        hook: HookPoint,
        handler: Arc<dyn HookHandler>,
        order: i32,
    ) {
        let mut table = self.table.write().await;
        let sequence = table.sequence_for(plugin_id);
        debug!(hook = %hook, plugin_id = %plugin_id, order, "Hook handler registered");
        table.push(plugin_id, sequence, HookRegistration::new(hook, handler, order));
    }

    /// Replaces every registration of `plugin_id` with `registrations`.
    pub async fn register_all(
        &self,
        plugin_id: &str,
        sequence: i64,
        registrations: Vec<HookRegistration>,
    ) {
        let mut table = self.table.write().await;
        table.remove(plugin_id);
        table.sequences.insert(plugin_id.to_string(), sequence);
        let count = registrations.len();
        for registration in registrations {
            table.push(plugin_id, sequence, registration);
        }
        info!(plugin_id = %plugin_id, sequence, handlers = count, "Plugin hooks registered");
    }

    /// Unregisters all handlers for a plugin. Returns how many were removed.
    pub async fn unregister(&self, plugin_id: &str) -> usize {
        let removed = self.table.write().await.remove(plugin_id);
        info!(plugin_id = %plugin_id, removed, "Plugin hooks unregistered");
        removed
    }

    /// Snapshot of the handlers for a hook, in execution order.
    pub async fn handlers(&self, hook: &HookPoint) -> Vec<HookEntry> {
        let table = self.table.read().await;
        table.hooks.get(hook).cloned().unwrap_or_default()
    }

    /// Returns the number of handlers registered for a hook point.
    pub async fn handler_count(&self, hook: &HookPoint) -> usize {
        let table = self.table.read().await;
        table.hooks.get(hook).map(Vec::len).unwrap_or(0)
    }

    /// Whether the plugin has any registration.
    pub async fn is_registered(&self, plugin_id: &str) -> bool {
        let table = self.table.read().await;
        table
            .hooks
            .values()
            .any(|entries| entries.iter().any(|e| e.plugin_id == plugin_id))
    }

    /// Ids of plugins with at least one registration.
    pub async fn registered_plugins(&self) -> Vec<String> {
        let table = self.table.read().await;
        let mut ids: Vec<String> = table
            .hooks
            .values()
            .flatten()
            .map(|e| e.plugin_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Returns all hook points with handlers.
    pub async fn registered_hooks(&self) -> Vec<HookPoint> {
        let table = self.table.read().await;
        table.hooks.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ClosureHandler;

    fn noop() -> Arc<dyn HookHandler> {
        Arc::new(ClosureHandler::new(|_| async { Ok(HookAction::Continue) }))
    }

    fn order_of(entries: &[HookEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.plugin_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_order_then_sequence() {
        let registry = HookRegistry::new();
        registry
            .register_all("late", 5, vec![HookRegistration::new(HookPoint::AdminMenu, noop(), 0)])
            .await;
        registry
            .register_all("early", 1, vec![HookRegistration::new(HookPoint::AdminMenu, noop(), 0)])
            .await;
        registry
            .register_all("first", 9, vec![HookRegistration::new(HookPoint::AdminMenu, noop(), -10)])
            .await;

        let entries = registry.handlers(&HookPoint::AdminMenu).await;
        assert_eq!(order_of(&entries), vec!["first", "early", "late"]);
    }

    #[tokio::test]
    async fn test_register_ranks_new_plugins_last() {
        let registry = HookRegistry::new();
        registry.register("a", HookPoint::PostContent, noop(), 0).await;
        registry.register("b", HookPoint::PostContent, noop(), 0).await;
        registry.register("a", HookPoint::PostContent, noop(), 0).await;

        let entries = registry.handlers(&HookPoint::PostContent).await;
        assert_eq!(order_of(&entries), vec!["a", "a", "b"]);
    }

    #[tokio::test]
    async fn test_unregister_removes_every_hook() {
        let registry = HookRegistry::new();
        registry
            .register_all(
                "seo",
                1,
                vec![
                    HookRegistration::new(HookPoint::AdminMenu, noop(), 0),
                    HookRegistration::new(HookPoint::BeforePostSave, noop(), 0),
                ],
            )
            .await;
        registry.register("other", HookPoint::AdminMenu, noop(), 0).await;

        assert_eq!(registry.unregister("seo").await, 2);
        assert!(!registry.is_registered("seo").await);
        assert_eq!(registry.handler_count(&HookPoint::BeforePostSave).await, 0);
        assert_eq!(registry.registered_plugins().await, vec!["other"]);
    }

    #[tokio::test]
    async fn test_register_all_replaces_previous_set() {
        let registry = HookRegistry::new();
        let one = vec![HookRegistration::new(HookPoint::AdminMenu, noop(), 0)];
        registry.register_all("x", 1, one.clone()).await;
        registry.register_all("x", 1, one).await;
        assert_eq!(registry.handler_count(&HookPoint::AdminMenu).await, 1);
    }
}
