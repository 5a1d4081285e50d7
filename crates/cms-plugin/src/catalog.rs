//! Plugins offered in the catalogue of a fresh installation.

use serde_json::{Map, Value, json};

use cms_entity::plugin::{HookDefinition, HookMap, HookSide, ManifestAction, PluginManifest};

fn menu_item(description: &str, title: &str, path: &str, roles: &[&str]) -> HookDefinition {
    HookDefinition {
        side: HookSide::Frontend,
        description: description.to_string(),
        order: 0,
        action: Some(ManifestAction::AppendMenuItem {
            item: json!({ "title": title, "path": path, "roles": roles }),
        }),
    }
}

fn declared(side: HookSide, description: &str, action: Option<ManifestAction>) -> HookDefinition {
    HookDefinition {
        side,
        description: description.to_string(),
        order: 0,
        action,
    }
}

fn hooks(entries: Vec<(&str, HookDefinition)>) -> HookMap {
    entries
        .into_iter()
        .map(|(name, def)| (name.to_string(), def.into()))
        .collect()
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The bundled manifest-only plugins.
pub fn bundled() -> Vec<PluginManifest> {
    vec![
        PluginManifest {
            id: Some("contact-form-7".into()),
            name: "Contact Form 7".into(),
            description: "Simple yet flexible contact form plugin with spam protection and multiple form support.".into(),
            version: "1.0.0".into(),
            author: "CMS Team".into(),
            category: "Forms".into(),
            price: "Free".into(),
            icon: None,
            features: strings(&[
                "Drag & drop form builder",
                "Spam protection",
                "Email notifications",
                "Custom styling options",
            ]),
            dependencies: Vec::new(),
            hooks: hooks(vec![
                (
                    "admin_menu",
                    menu_item("Add Contact Forms menu item", "Contact Forms", "/admin/contact-forms", &["admin", "editor"]),
                ),
                (
                    "post_content",
                    declared(HookSide::Frontend, "Process contact form shortcodes", None),
                ),
            ]),
            settings_schema: json!({
                "spam_protection": {"type": "boolean", "default": true},
                "notification_email": {"type": "string", "default": ""}
            }),
        },
        PluginManifest {
            id: Some("seo-optimizer".into()),
            name: "SEO Optimizer".into(),
            description: "Complete SEO solution with meta tags, sitemap generation, and search engine optimization tools.".into(),
            version: "2.1.0".into(),
            author: "SEO Experts".into(),
            category: "SEO".into(),
            price: "$29".into(),
            icon: None,
            features: strings(&[
                "Meta tag optimization",
                "XML sitemap generation",
                "Social media integration",
                "Analytics tracking",
            ]),
            dependencies: Vec::new(),
            hooks: hooks(vec![
                (
                    "admin_menu",
                    menu_item("Add SEO Settings menu item", "SEO Settings", "/admin/seo", &["admin", "editor"]),
                ),
                (
                    "before_post_save",
                    declared(
                        HookSide::Backend,
                        "Optimize post SEO before saving",
                        Some(ManifestAction::MergeFields {
                            fields: object(json!({"seo": {"indexed": true, "sitemap": true}})),
                            overwrite: false,
                        }),
                    ),
                ),
            ]),
            settings_schema: json!({
                "sitemap": {"type": "boolean", "default": true}
            }),
        },
        PluginManifest {
            id: Some("ecommerce-lite".into()),
            name: "E-commerce Lite".into(),
            description: "Turn your CMS into an online store with products, shopping cart, and payment integration.".into(),
            version: "1.5.0".into(),
            author: "Commerce Team".into(),
            category: "E-commerce".into(),
            price: "$99".into(),
            icon: None,
            features: strings(&[
                "Product management",
                "Shopping cart",
                "Payment gateway integration",
                "Order management",
            ]),
            dependencies: Vec::new(),
            hooks: hooks(vec![
                (
                    "admin_menu",
                    menu_item("Add Products menu item", "Products", "/admin/products", &["admin"]),
                ),
                (
                    "dashboard_stats",
                    declared(
                        HookSide::Both,
                        "Add orders card",
                        Some(ManifestAction::AppendStat {
                            stat: json!({"title": "Orders", "value": "0", "change": "+0%", "changeType": "neutral"}),
                        }),
                    ),
                ),
            ]),
            settings_schema: json!({
                "currency": {"type": "string", "default": "USD"}
            }),
        },
        PluginManifest {
            id: Some("backup-manager".into()),
            name: "Backup Manager".into(),
            description: "Automated backup solution for your content, database, and files with cloud storage support.".into(),
            version: "1.2.0".into(),
            author: "Backup Solutions".into(),
            category: "Utility".into(),
            price: "Free".into(),
            icon: None,
            features: strings(&[
                "Scheduled backups",
                "Cloud storage integration",
                "One-click restore",
                "Backup verification",
            ]),
            dependencies: Vec::new(),
            hooks: hooks(vec![
                (
                    "admin_menu",
                    menu_item("Add Backups menu item", "Backups", "/admin/backups", &["admin"]),
                ),
                (
                    "dashboard_stats",
                    declared(
                        HookSide::Both,
                        "Report backup status",
                        Some(ManifestAction::PrependActivity {
                            activity: json!({"type": "backup", "message": "Backup Manager is protecting your content", "icon": "Database"}),
                        }),
                    ),
                ),
            ]),
            settings_schema: json!({}),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_manifests_are_valid() {
        let manifests = bundled();
        assert_eq!(manifests.len(), 4);
        for manifest in &manifests {
            manifest.check().unwrap();
            assert!(manifest.hooks.contains_key("admin_menu"));
        }
    }
}
