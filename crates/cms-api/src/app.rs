//! Application builder: wires stores, plugins and services into `AppState`
//! and serves the router.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};

use cms_core::config::{AppConfig, DatabaseConfig, DispatcherMode};
use cms_core::error::AppError;
use cms_database::migration::run_migrations;
use cms_database::store::{ContentStore, PluginStore};
use cms_database::{
    ContentRepository, DatabasePool, InMemoryContentStore, InMemoryPluginStore, PluginRepository,
};
use cms_plugin::{
    Dispatcher, HookRegistry, LocalDispatcher, PluginManager, PluginRegistry, RemoteDispatcher,
    catalog, loader, modules,
};
use cms_service::{ContentService, DashboardService};

use crate::jwt::JwtCodec;
use crate::router::build_router;
use crate::state::AppState;

/// The persistence backends the server runs on.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Plugin records.
    pub plugins: Arc<dyn PluginStore>,
    /// Posts and pages.
    pub content: Arc<dyn ContentStore>,
}

impl Stores {
    /// Process-local stores; nothing survives a restart.
    pub fn in_memory() -> Self {
        Self {
            plugins: Arc::new(InMemoryPluginStore::new()),
            content: Arc::new(InMemoryContentStore::new()),
        }
    }

    /// Connects to PostgreSQL and applies migrations when `database.url` is
    /// set, otherwise falls back to in-memory stores.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        if !config.is_configured() {
            warn!("No database configured, using in-memory stores");
            return Ok(Self::in_memory());
        }
        let pool = DatabasePool::connect(config).await?;
        run_migrations(pool.pool()).await?;
        Ok(Self::postgres(&pool))
    }

    /// PostgreSQL repositories over a connected pool.
    pub fn postgres(pool: &DatabasePool) -> Self {
        Self {
            plugins: Arc::new(PluginRepository::new(pool.pool().clone())),
            content: Arc::new(ContentRepository::new(pool.pool().clone())),
        }
    }
}

/// Builds the shared state: seeds the catalogue, restores active plugins and
/// selects the dispatcher.
pub async fn build_state(config: AppConfig, stores: Stores) -> Result<AppState, AppError> {
    let hooks = Arc::new(HookRegistry::new());
    let registry = Arc::new(
        PluginRegistry::new(Arc::clone(&stores.plugins))
            .with_modules(modules::builtin(Arc::clone(&stores.content))),
    );

    if config.plugins.seed_catalog {
        let added = registry.seed(registry.catalogue(catalog::bundled())).await?;
        info!(added, "Plugin catalogue seeded");
    }
    if config.plugins.auto_load && !config.plugins.directory.is_empty() {
        let manifests = loader::load_manifests(Path::new(&config.plugins.directory)).await?;
        let found = manifests.len();
        let added = registry.seed(manifests).await?;
        info!(directory = %config.plugins.directory, found, added, "Plugin directory scanned");
    }

    let local_dispatcher = Arc::new(LocalDispatcher::with_timeout(
        Arc::clone(&hooks),
        config.plugins.handler_timeout(),
    ));
    let dispatcher: Arc<dyn Dispatcher> = match config.plugins.dispatcher {
        DispatcherMode::Local => Arc::clone(&local_dispatcher) as Arc<dyn Dispatcher>,
        DispatcherMode::Remote => {
            let remote = RemoteDispatcher::new(
                &config.plugins.remote_url,
                Some(config.plugins.remote_token.clone()),
                config.plugins.remote_timeout(),
            )?;
            info!(endpoint = %remote.endpoint(), "Dispatching hooks remotely");
            Arc::new(remote)
        }
    };

    let plugins = Arc::new(PluginManager::new(registry, hooks, Arc::clone(&dispatcher)));
    let loaded = plugins.load_active().await?;
    info!(loaded, "Plugin registrations restored");

    let content = ContentService::new(Arc::clone(&stores.content), dispatcher);
    let dashboard = DashboardService::new(Arc::clone(&plugins), content.clone());

    Ok(AppState {
        jwt: Arc::new(JwtCodec::new(&config.auth)),
        config: Arc::new(config),
        plugins,
        local_dispatcher,
        content,
        dashboard,
        started_at: Instant::now(),
    })
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
    build_router(state).layer(TimeoutLayer::new(timeout))
}

/// Serves the application until `shutdown` resolves.
pub async fn serve(
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    let addr = state.config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::configuration(format!("Failed to bind {addr}: {e}")))?;
    info!(address = %addr, "CMS Pro API listening");

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))
}
