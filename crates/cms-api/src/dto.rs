//! Request and response bodies that are not domain types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use cms_entity::content::{ContentKind, ContentStatus};

/// `POST /api/plugins/execute-hook` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookExecution {
    /// Hook to dispatch.
    pub hook_name: String,
    /// Initial payload.
    #[serde(default)]
    pub data: Value,
}

/// Outcome of a plugin action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
    /// Plugin the action applied to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
}

impl MessageResponse {
    /// Creates a message about a plugin.
    pub fn plugin(plugin_id: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            plugin_id: Some(plugin_id.to_string()),
        }
    }
}

/// `GET /api/plugins/{id}/settings` and `PUT` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsBody {
    /// Settings object.
    pub settings: Value,
}

/// `GET /api/posts` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostQuery {
    /// Restrict to posts or pages.
    pub kind: Option<ContentKind>,
    /// Restrict to a status.
    pub status: Option<ContentStatus>,
    /// Maximum number of items.
    pub limit: Option<i64>,
}

/// `GET /api/dashboard/activity` query.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityQuery {
    /// Maximum number of entries.
    #[serde(default = "default_activity_limit")]
    pub limit: i64,
}

fn default_activity_limit() -> i64 {
    10
}

/// `GET /api/health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `healthy` when the server answers.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Number of plugins with live registrations.
    pub plugins: usize,
    /// `local` or `remote`.
    pub dispatcher: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
}

/// Result of an activation, installation or settings change.
#[derive(Debug, Clone, Serialize)]
pub struct PluginActionResponse {
    /// Human-readable message.
    pub message: String,
    /// The plugin after the action.
    pub plugin: cms_entity::plugin::PluginRecord,
}
