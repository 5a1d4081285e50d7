//! Plugin manager: activation lifecycle that keeps hook registrations in
//! step with plugin status.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

use cms_core::error::AppError;
use cms_core::result::AppResult;
use cms_entity::plugin::{PluginManifest, PluginRecord, PluginStatus};

use crate::hooks::definitions::{DispatchOutcome, HookPoint};
use crate::hooks::dispatcher::{Dispatcher, LocalDispatcher};
use crate::hooks::registry::HookRegistry;
use crate::registry::PluginRegistry;

/// A frontend-visible hook of an active plugin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontendHook {
    /// Owning plugin.
    pub plugin_id: String,
    /// Hook name.
    pub hook: String,
    /// Declared description.
    pub description: String,
    /// Declared order.
    pub order: i32,
}

/// Manages plugin activation, installation and removal.
///
/// Mutations are serialized per plugin id; dispatch only takes the hook
/// registry's read lock.
#[derive(Debug)]
pub struct PluginManager {
    registry: Arc<PluginRegistry>,
    hooks: Arc<HookRegistry>,
    dispatcher: Arc<dyn Dispatcher>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PluginManager {
    /// Creates a manager over an explicit dispatcher.
    pub fn new(
        registry: Arc<PluginRegistry>,
        hooks: Arc<HookRegistry>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            registry,
            hooks,
            dispatcher,
            locks: DashMap::new(),
        }
    }

    /// Creates a manager dispatching in-process over `hooks`.
    pub fn local(
        registry: Arc<PluginRegistry>,
        hooks: Arc<HookRegistry>,
        handler_timeout: std::time::Duration,
    ) -> Self {
        let dispatcher = Arc::new(LocalDispatcher::with_timeout(
            Arc::clone(&hooks),
            handler_timeout,
        ));
        Self::new(registry, hooks, dispatcher)
    }

    /// Returns the plugin registry.
    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// Returns the hook registry.
    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    /// Returns the dispatcher.
    pub fn dispatcher(&self) -> &Arc<dyn Dispatcher> {
        &self.dispatcher
    }

    async fn lock(&self, id: &str) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }

    async fn check_dependencies(&self, record: &PluginRecord) -> AppResult<()> {
        if record.dependencies.is_empty() {
            return Ok(());
        }
        let active = self.registry.list_by_status(PluginStatus::Active).await?;
        let missing: Vec<&str> = record
            .dependencies
            .iter()
            .filter(|dep| !active.iter().any(|p| p.satisfies(dep)))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "Plugin '{}' requires inactive dependencies: {}",
                record.id,
                missing.join(", ")
            )))
        }
    }

    /// Activates a plugin and registers its handlers.
    ///
    /// No-op when already active. On failure nothing is left registered.
    pub async fn activate(&self, id: &str) -> AppResult<PluginRecord> {
        let _guard = self.lock(id).await;
        let mut record = self.registry.get(id).await?;
        if record.is_active() {
            debug!(plugin_id = %id, "Plugin already active");
            return Ok(record);
        }

        self.check_dependencies(&record).await?;

        if record.status == PluginStatus::Available {
            record.install_seq = self.registry.reinstall_order(id).await?;
        }

        let registrations = self.registry.resolve_handlers(&record);
        let handler_count = registrations.len();
        self.hooks
            .register_all(&record.id, record.install_seq, registrations)
            .await;

        match self.registry.set_status(id, PluginStatus::Active).await {
            Ok(updated) => {
                info!(plugin_id = %id, handlers = handler_count, "Plugin activated");
                Ok(updated)
            }
            Err(e) => {
                error!(plugin_id = %id, error = %e, "Activation failed, rolling back hooks");
                self.hooks.unregister(id).await;
                Err(e)
            }
        }
    }

    /// Deactivates a plugin and removes its handlers. No-op when not active.
    pub async fn deactivate(&self, id: &str) -> AppResult<PluginRecord> {
        let _guard = self.lock(id).await;
        let record = self.registry.get(id).await?;
        if !record.is_active() {
            debug!(plugin_id = %id, status = %record.status, "Plugin not active");
            return Ok(record);
        }
        self.deactivate_locked(&record).await
    }

    async fn deactivate_locked(&self, record: &PluginRecord) -> AppResult<PluginRecord> {
        self.hooks.unregister(&record.id).await;
        match self
            .registry
            .set_status(&record.id, PluginStatus::Installed)
            .await
        {
            Ok(updated) => {
                info!(plugin_id = %record.id, "Plugin deactivated");
                Ok(updated)
            }
            Err(e) => {
                error!(plugin_id = %record.id, error = %e, "Deactivation failed, restoring hooks");
                let registrations = self.registry.resolve_handlers(record);
                self.hooks
                    .register_all(&record.id, record.install_seq, registrations)
                    .await;
                Err(e)
            }
        }
    }

    /// Moves a plugin to `status`, going through activation or deactivation
    /// whenever `active` is on either side of the transition.
    pub async fn set_status(&self, id: &str, status: PluginStatus) -> AppResult<PluginRecord> {
        match status {
            PluginStatus::Active => self.activate(id).await,
            PluginStatus::Installed => {
                let record = self.deactivate(id).await?;
                if record.status == PluginStatus::Available {
                    self.install_available(id).await
                } else {
                    Ok(record)
                }
            }
            PluginStatus::Available => {
                self.deactivate(id).await?;
                let _guard = self.lock(id).await;
                self.registry.set_status(id, PluginStatus::Available).await
            }
        }
    }

    /// Installs a plugin from its manifest. The new plugin is `installed`,
    /// not active.
    pub async fn install(&self, manifest: PluginManifest) -> AppResult<PluginRecord> {
        let id = manifest.plugin_id();
        let _guard = self.lock(&id).await;
        self.registry.install(manifest, PluginStatus::Installed).await
    }

    /// Installs a catalogue plugin (`available` → `installed`). Plugins that
    /// are already installed are returned unchanged.
    pub async fn install_available(&self, id: &str) -> AppResult<PluginRecord> {
        let _guard = self.lock(id).await;
        let record = self.registry.get(id).await?;
        if record.status != PluginStatus::Available {
            return Ok(record);
        }
        self.registry.reinstall_order(id).await?;
        let record = self.registry.set_status(id, PluginStatus::Installed).await?;
        info!(plugin_id = %id, install_seq = record.install_seq, "Plugin installed");
        Ok(record)
    }

    /// Deactivates and deletes a plugin.
    pub async fn uninstall(&self, id: &str) -> AppResult<()> {
        let _guard = self.lock(id).await;
        let record = self.registry.get(id).await?;
        if record.is_active() {
            self.hooks.unregister(id).await;
        }
        if let Err(e) = self.registry.remove(id).await {
            if record.is_active() {
                error!(plugin_id = %id, error = %e, "Uninstall failed, restoring hooks");
                let registrations = self.registry.resolve_handlers(&record);
                self.hooks
                    .register_all(&record.id, record.install_seq, registrations)
                    .await;
            }
            return Err(e);
        }
        self.locks.remove(id);
        info!(plugin_id = %id, "Plugin uninstalled");
        Ok(())
    }

    /// Replaces a plugin's settings. Active plugins are re-registered so
    /// handlers built from settings pick up the change.
    pub async fn update_settings(&self, id: &str, settings: Value) -> AppResult<PluginRecord> {
        let _guard = self.lock(id).await;
        let record = self.registry.update_settings(id, settings).await?;
        if record.is_active() {
            let registrations = self.registry.resolve_handlers(&record);
            self.hooks
                .register_all(&record.id, record.install_seq, registrations)
                .await;
        }
        Ok(record)
    }

    /// Registers the handlers of every `active` plugin. Called at startup.
    /// Returns the number of plugins loaded.
    pub async fn load_active(&self) -> AppResult<usize> {
        let active = self.registry.list_by_status(PluginStatus::Active).await?;
        let mut loaded = 0;
        for record in &active {
            let _guard = self.lock(&record.id).await;
            if let Err(e) = self.check_dependencies(record).await {
                warn!(plugin_id = %record.id, error = %e, "Active plugin has unmet dependencies");
            }
            let registrations = self.registry.resolve_handlers(record);
            self.hooks
                .register_all(&record.id, record.install_seq, registrations)
                .await;
            loaded += 1;
        }
        info!(count = loaded, "Active plugins loaded");
        Ok(loaded)
    }

    /// Folds the active handlers for `hook` over `payload`.
    pub async fn dispatch(&self, hook: &HookPoint, payload: Value) -> DispatchOutcome {
        self.dispatcher.dispatch(hook, payload).await
    }

    /// Frontend-visible hooks declared by active plugins.
    pub async fn frontend_hooks(&self) -> AppResult<Vec<FrontendHook>> {
        let active = self.registry.list_by_status(PluginStatus::Active).await?;
        Ok(active
            .iter()
            .flat_map(|record| {
                record.hooks.iter().flat_map(move |(name, binding)| {
                    binding
                        .definitions()
                        .iter()
                        .filter(|def| def.side.is_frontend())
                        .map(move |def| FrontendHook {
                            plugin_id: record.id.clone(),
                            hook: name.clone(),
                            description: def.description.clone(),
                            order: def.order,
                        })
                })
            })
            .collect())
    }
}
