//! Plugin record and lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use cms_core::error::AppError;

use super::hook::HookMap;
use super::manifest::PluginManifest;

/// Lifecycle status of a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "plugin_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PluginStatus {
    /// Listed in the catalogue, not installed.
    Available,
    /// Installed but contributing no handlers.
    Installed,
    /// Installed and contributing handlers.
    Active,
}

impl PluginStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Installed => "installed",
            Self::Active => "active",
        }
    }

    /// Whether the plugin is installed (active or not).
    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Installed | Self::Active)
    }
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PluginStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "installed" => Ok(Self::Installed),
            "active" => Ok(Self::Active),
            _ => Err(AppError::validation(format!(
                "Invalid plugin status: '{s}'. Expected one of: available, installed, active"
            ))),
        }
    }
}

/// A plugin known to the CMS.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PluginRecord {
    /// Stable identifier (slug).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Semantic version.
    pub version: String,
    /// Author or vendor.
    pub author: String,
    /// Catalogue category.
    pub category: String,
    /// Display price.
    pub price: String,
    /// Icon URL.
    pub icon: Option<String>,
    /// Lifecycle status.
    pub status: PluginStatus,
    /// Feature bullet points.
    pub features: Vec<String>,
    /// Names of plugins that must be active before this one.
    pub dependencies: Vec<String>,
    /// Declared hook handlers.
    #[sqlx(json)]
    pub hooks: HookMap,
    /// Current settings values.
    pub settings: Value,
    /// Settings schema.
    pub settings_schema: Value,
    /// Monotonic install sequence, used to break dispatch ties.
    pub install_seq: i64,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl PluginRecord {
    /// Build a record from a manifest. Settings start from the schema defaults.
    pub fn from_manifest(manifest: PluginManifest, status: PluginStatus, install_seq: i64) -> Self {
        let now = Utc::now();
        let settings = default_settings(&manifest.settings_schema);
        Self {
            id: manifest.plugin_id(),
            name: manifest.name,
            description: manifest.description,
            version: manifest.version,
            author: manifest.author,
            category: manifest.category,
            price: manifest.price,
            icon: manifest.icon,
            status,
            features: manifest.features,
            dependencies: manifest.dependencies,
            hooks: manifest.hooks,
            settings,
            settings_schema: manifest.settings_schema,
            install_seq,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the plugin is currently active.
    pub fn is_active(&self) -> bool {
        self.status == PluginStatus::Active
    }

    /// Whether `dependency` names this plugin (by name or id).
    pub fn satisfies(&self, dependency: &str) -> bool {
        self.name.eq_ignore_ascii_case(dependency) || self.id.eq_ignore_ascii_case(dependency)
    }
}

/// Collect `default` values from a `{key: {type, default}}` schema.
fn default_settings(schema: &Value) -> Value {
    let defaults = schema
        .as_object()
        .map(|fields| {
            fields
                .iter()
                .filter_map(|(key, field)| field.get("default").map(|d| (key.clone(), d.clone())))
                .collect()
        })
        .unwrap_or_default();
    Value::Object(defaults)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("Active".parse::<PluginStatus>().unwrap(), PluginStatus::Active);
        assert_eq!(PluginStatus::Installed.to_string(), "installed");
        assert!("enabled".parse::<PluginStatus>().is_err());
    }

    #[test]
    fn test_from_manifest_seeds_settings_defaults() {
        let manifest: PluginManifest = serde_json::from_value(serde_json::json!({
            "name": "Contact Form 7",
            "description": "Forms",
            "version": "1.0.0",
            "author": "CMS Team",
            "dependencies": ["SEO Optimizer"],
            "settings_schema": {
                "spam_protection": {"type": "boolean", "default": true},
                "notification_email": {"type": "string"}
            }
        }))
        .unwrap();

        let record = PluginRecord::from_manifest(manifest, PluginStatus::Installed, 3);
        assert_eq!(record.id, "contact-form-7");
        assert_eq!(record.settings, serde_json::json!({"spam_protection": true}));
        assert_eq!(record.install_seq, 3);
        assert!(!record.is_active());
    }
}
