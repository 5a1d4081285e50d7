//! Plugin system configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which hook dispatcher implementation the host composes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatcherMode {
    /// Handlers run in this process.
    #[default]
    Local,
    /// Hooks are forwarded to another CMS instance over HTTP.
    Remote,
}

/// Plugin system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Directory scanned for `*/plugin.json` manifests on startup.
    #[serde(default = "default_plugin_directory")]
    pub directory: String,
    /// Whether to add manifests found in `directory` to the catalogue on startup.
    #[serde(default = "default_true")]
    pub auto_load: bool,
    /// Whether to seed the bundled plugin catalogue as `available` records.
    #[serde(default = "default_true")]
    pub seed_catalog: bool,
    /// Per-handler timeout in milliseconds.
    #[serde(default = "default_handler_timeout")]
    pub handler_timeout_ms: u64,
    /// Dispatcher implementation.
    #[serde(default)]
    pub dispatcher: DispatcherMode,
    /// Base URL of the remote CMS when `dispatcher = "remote"`.
    #[serde(default)]
    pub remote_url: String,
    /// Bearer token presented to the remote CMS.
    #[serde(default)]
    pub remote_token: String,
    /// Timeout for a whole remote dispatch in milliseconds.
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout_ms: u64,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            directory: default_plugin_directory(),
            auto_load: true,
            seed_catalog: true,
            handler_timeout_ms: default_handler_timeout(),
            dispatcher: DispatcherMode::Local,
            remote_url: String::new(),
            remote_token: String::new(),
            remote_timeout_ms: default_remote_timeout(),
        }
    }
}

impl PluginConfig {
    /// Per-handler timeout as a `Duration`.
    pub fn handler_timeout(&self) -> Duration {
        Duration::from_millis(self.handler_timeout_ms)
    }

    /// Remote dispatch timeout as a `Duration`.
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }
}

fn default_plugin_directory() -> String {
    "./plugins".to_string()
}

fn default_true() -> bool {
    true
}

fn default_handler_timeout() -> u64 {
    300
}

fn default_remote_timeout() -> u64 {
    2000
}
