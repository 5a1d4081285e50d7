//! Plugin registry: the catalogue of plugin records and compiled-in modules.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use cms_core::error::AppError;
use cms_core::result::AppResult;
use cms_database::store::PluginStore;
use cms_entity::plugin::{PluginManifest, PluginRecord, PluginStatus};

use crate::handlers::ActionHandler;
use crate::hooks::definitions::HookPoint;
use crate::hooks::registry::{HookHandler, HookRegistration};
use crate::traits::PluginModule;

/// Filters for listing plugins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginQuery {
    /// Only plugins with this status.
    pub status: Option<PluginStatus>,
    /// Only plugins in this category (case-insensitive).
    pub category: Option<String>,
    /// Substring of name or description (case-insensitive).
    pub search: Option<String>,
}

impl PluginQuery {
    fn matches(&self, record: &PluginRecord) -> bool {
        if self.status.is_some_and(|s| s != record.status) {
            return false;
        }
        if let Some(category) = &self.category {
            if !record.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            return record.name.to_lowercase().contains(&needle)
                || record.description.to_lowercase().contains(&needle);
        }
        true
    }
}

/// Registry of plugin records backed by a [`PluginStore`].
///
/// Status writes here are raw; callers that must keep hook registrations in
/// sync go through [`crate::manager::PluginManager`].
#[derive(Debug)]
pub struct PluginRegistry {
    store: Arc<dyn PluginStore>,
    modules: HashMap<String, Arc<dyn PluginModule>>,
}

impl PluginRegistry {
    /// Creates a registry with no compiled-in modules.
    pub fn new(store: Arc<dyn PluginStore>) -> Self {
        Self {
            store,
            modules: HashMap::new(),
        }
    }

    /// Adds compiled-in modules.
    pub fn with_modules(mut self, modules: impl IntoIterator<Item = Arc<dyn PluginModule>>) -> Self {
        for module in modules {
            self.modules.insert(module.id().to_string(), module);
        }
        self
    }

    /// Returns the compiled-in module for a plugin id.
    pub fn module(&self, id: &str) -> Option<&Arc<dyn PluginModule>> {
        self.modules.get(id)
    }

    /// Lists all plugins in install order.
    pub async fn list(&self) -> AppResult<Vec<PluginRecord>> {
        self.store.find_all().await
    }

    /// Lists plugins with the given status.
    pub async fn list_by_status(&self, status: PluginStatus) -> AppResult<Vec<PluginRecord>> {
        self.store.find_by_status(status).await
    }

    /// Lists plugins matching a query.
    pub async fn search(&self, query: &PluginQuery) -> AppResult<Vec<PluginRecord>> {
        let records = match query.status {
            Some(status) => self.store.find_by_status(status).await?,
            None => self.store.find_all().await?,
        };
        Ok(records.into_iter().filter(|r| query.matches(r)).collect())
    }

    /// Gets a plugin by id.
    pub async fn get(&self, id: &str) -> AppResult<PluginRecord> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Plugin '{id}' not found")))
    }

    /// Writes the status field. Last write wins.
    pub async fn set_status(&self, id: &str, status: PluginStatus) -> AppResult<PluginRecord> {
        self.store.update_status(id, status).await?;
        self.get(id).await
    }

    /// Moves an existing plugin to the end of the install order.
    pub async fn reinstall_order(&self, id: &str) -> AppResult<i64> {
        self.store.bump_install_seq(id).await
    }

    /// Inserts a record for `manifest` with the given status.
    pub async fn install(
        &self,
        manifest: PluginManifest,
        status: PluginStatus,
    ) -> AppResult<PluginRecord> {
        manifest.check()?;
        let id = manifest.plugin_id();
        if self.store.find_by_id(&id).await?.is_some() {
            return Err(AppError::conflict(format!("Plugin '{id}' already exists")));
        }
        let seq = self.store.next_install_seq().await?;
        let record = PluginRecord::from_manifest(manifest, status, seq);
        self.store.insert(&record).await?;
        info!(plugin_id = %record.id, status = %status, install_seq = seq, "Plugin added to registry");
        Ok(record)
    }

    /// Deletes a record. NotFound if unknown.
    pub async fn remove(&self, id: &str) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(AppError::not_found(format!("Plugin '{id}' not found")));
        }
        Ok(())
    }

    /// Returns the plugin's settings object.
    pub async fn settings(&self, id: &str) -> AppResult<Value> {
        Ok(self.get(id).await?.settings)
    }

    /// Replaces the plugin's settings object.
    pub async fn update_settings(&self, id: &str, settings: Value) -> AppResult<PluginRecord> {
        if !settings.is_object() {
            return Err(AppError::validation("Plugin settings must be a JSON object"));
        }
        self.store.update_settings(id, &settings).await?;
        self.get(id).await
    }

    /// Adds every catalogue manifest that is not yet known as `available`.
    /// Returns how many were added.
    pub async fn seed(&self, manifests: Vec<PluginManifest>) -> AppResult<usize> {
        let mut added = 0;
        for manifest in manifests {
            let id = manifest.plugin_id();
            if self.store.find_by_id(&id).await?.is_some() {
                continue;
            }
            self.install(manifest, PluginStatus::Available).await?;
            added += 1;
        }
        Ok(added)
    }

    /// Every manifest the registry can offer: the given manifests plus the
    /// compiled-in modules.
    pub fn catalogue(&self, mut manifests: Vec<PluginManifest>) -> Vec<PluginManifest> {
        let mut modules: Vec<_> = self.modules.values().collect();
        modules.sort_by_key(|m| m.id());
        manifests.extend(modules.into_iter().map(|m| m.manifest()));
        manifests
    }

    /// Builds the handlers a record contributes when active.
    ///
    /// A definition with a declarative action uses it; otherwise the
    /// plugin's compiled-in module is asked. Definitions with neither are
    /// declared for the UI only and register nothing.
    pub fn resolve_handlers(&self, record: &PluginRecord) -> Vec<HookRegistration> {
        let module = self.modules.get(&record.id);
        let mut registrations = Vec::new();

        for (name, binding) in &record.hooks {
            let hook = HookPoint::from(name.as_str());
            for definition in binding.definitions() {
                let handler = match &definition.action {
                    Some(action) => Some(Arc::new(ActionHandler::new(action.clone())) as Arc<dyn HookHandler>),
                    None => module.and_then(|m| m.handler(&hook, &record.settings)),
                };
                match handler {
                    Some(handler) => registrations.push(HookRegistration::new(
                        hook.clone(),
                        handler,
                        definition.order,
                    )),
                    None => debug!(
                        plugin_id = %record.id,
                        hook = %hook,
                        "Hook declared without an implementation"
                    ),
                }
            }
        }
        registrations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::modules::SocialShareModule;
    use cms_database::InMemoryPluginStore;

    fn registry() -> PluginRegistry {
        PluginRegistry::new(Arc::new(InMemoryPluginStore::new()))
            .with_modules([Arc::new(SocialShareModule) as Arc<dyn PluginModule>])
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let registry = registry();
        let catalogue = registry.catalogue(catalog::bundled());
        assert_eq!(registry.seed(catalogue.clone()).await.unwrap(), 5);
        assert_eq!(registry.seed(catalogue).await.unwrap(), 0);

        let available = registry.list_by_status(PluginStatus::Available).await.unwrap();
        assert_eq!(available.len(), 5);
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let err = registry().get("ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_search_filters() {
        let registry = registry();
        registry.seed(catalog::bundled()).await.unwrap();

        let query = PluginQuery {
            category: Some("seo".into()),
            ..Default::default()
        };
        let found = registry.search(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "seo-optimizer");

        let query = PluginQuery {
            search: Some("BACKUP".into()),
            ..Default::default()
        };
        assert_eq!(registry.search(&query).await.unwrap()[0].id, "backup-manager");
    }

    #[tokio::test]
    async fn test_resolve_prefers_actions_then_module() {
        let registry = registry();
        registry.seed(registry.catalogue(catalog::bundled())).await.unwrap();

        let contact = registry.get("contact-form-7").await.unwrap();
        let hooks: Vec<_> = registry
            .resolve_handlers(&contact)
            .into_iter()
            .map(|r| r.hook)
            .collect();
        assert_eq!(hooks, vec![HookPoint::AdminMenu]);

        let social = registry.get("social-share").await.unwrap();
        assert_eq!(registry.resolve_handlers(&social).len(), 3);
    }

    #[tokio::test]
    async fn test_settings_must_be_object() {
        let registry = registry();
        registry.seed(catalog::bundled()).await.unwrap();
        let err = registry
            .update_settings("seo-optimizer", serde_json::json!([1]))
            .await
            .unwrap_err();
        assert_eq!(err.kind, cms_core::error::ErrorKind::Validation);
    }
}
