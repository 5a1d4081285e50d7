//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use cms_core::config::AppConfig;
use cms_plugin::{LocalDispatcher, PluginManager};
use cms_service::{ContentService, DashboardService};

use crate::jwt::JwtCodec;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Activation manager and plugin catalogue.
    pub plugins: Arc<PluginManager>,
    /// In-process dispatcher over this node's registrations. `execute-hook`
    /// always runs here, even when the node dispatches remotely itself.
    pub local_dispatcher: Arc<LocalDispatcher>,
    /// Post storage with save/render hooks.
    pub content: ContentService,
    /// Menu and dashboard composition.
    pub dashboard: DashboardService,
    /// Bearer token codec.
    pub jwt: Arc<JwtCodec>,
    /// When the server started.
    pub started_at: Instant,
}
