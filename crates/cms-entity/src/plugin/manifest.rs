//! Plugin manifest (`plugin.json`).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use cms_core::error::AppError;

use super::hook::HookMap;

/// The JSON description a plugin ships with.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PluginManifest {
    /// Explicit id. Derived from `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name.
    #[validate(length(min = 1, max = 200, message = "Plugin name is required"))]
    pub name: String,
    /// Short description.
    #[validate(length(min = 1, message = "Plugin description is required"))]
    pub description: String,
    /// Semantic version.
    #[validate(length(min = 1, max = 50, message = "Plugin version is required"))]
    pub version: String,
    /// Author or vendor.
    #[validate(length(min = 1, message = "Plugin author is required"))]
    pub author: String,
    /// Catalogue category.
    #[serde(default = "default_category")]
    pub category: String,
    /// Display price.
    #[serde(default = "default_price")]
    pub price: String,
    /// Icon URL.
    #[serde(default)]
    pub icon: Option<String>,
    /// Feature bullet points.
    #[serde(default)]
    pub features: Vec<String>,
    /// Names of plugins that must be active first.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Declared hook handlers.
    #[serde(default)]
    pub hooks: HookMap,
    /// Settings schema shown by a settings UI.
    #[serde(default = "empty_object")]
    pub settings_schema: Value,
}

fn default_category() -> String {
    "General".to_string()
}

fn default_price() -> String {
    "Free".to_string()
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl PluginManifest {
    /// Parse and validate a manifest document.
    pub fn from_json(source: &str) -> Result<Self, AppError> {
        let manifest: Self = serde_json::from_str(source)
            .map_err(|e| AppError::validation(format!("Invalid plugin manifest: {e}")))?;
        manifest.check()?;
        Ok(manifest)
    }

    /// Run field validation, flattening failures into a single error.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()
            .map_err(|e| AppError::validation(format!("Invalid plugin manifest: {e}")))?;
        if self.plugin_id().is_empty() {
            return Err(AppError::validation(
                "Plugin name must contain at least one alphanumeric character",
            ));
        }
        Ok(())
    }

    /// The plugin id: the explicit `id`, or a slug of the name.
    pub fn plugin_id(&self) -> String {
        match &self.id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => slugify(&self.name),
        }
    }
}

/// Lowercase, non-alphanumerics collapsed to single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut dash = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            slug.push(ch);
            dash = false;
        } else if !dash && !slug.is_empty() {
            slug.push('-');
            dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_derived_from_name() {
        let manifest = PluginManifest::from_json(
            r#"{"name": "Social Media Share & Like", "description": "d", "version": "1.0.0", "author": "a"}"#,
        )
        .unwrap();
        assert_eq!(manifest.plugin_id(), "social-media-share-like");
        assert_eq!(manifest.category, "General");
        assert_eq!(manifest.price, "Free");
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let err = PluginManifest::from_json(
            r#"{"name": "X", "description": "", "version": "1", "author": "a"}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind, cms_core::error::ErrorKind::Validation);

        assert!(PluginManifest::from_json(r#"{"name": "X"}"#).is_err());
    }

    #[test]
    fn test_explicit_id_wins() {
        let manifest = PluginManifest {
            id: Some("seo".into()),
            name: "SEO Optimizer".into(),
            ..Default::default()
        };
        assert_eq!(manifest.plugin_id(), "seo");
    }
}
