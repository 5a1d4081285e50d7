//! Social sharing: share counters on posts, share links and an admin page.

use std::sync::Arc;

use serde_json::{Map, Value, json};

use cms_entity::plugin::{HookDefinition, HookSide, PluginManifest};

use crate::hooks::definitions::{HookAction, HookPoint};
use crate::hooks::registry::HookHandler;
use crate::traits::{ClosureHandler, PluginModule};

/// Plugin id.
pub const ID: &str = "social-share";

const PLATFORMS: &[&str] = &[
    "facebook",
    "twitter",
    "linkedin",
    "whatsapp",
    "telegram",
    "reddit",
    "pinterest",
];

/// Adds share counters and share URLs to posts.
#[derive(Debug, Default, Clone, Copy)]
pub struct SocialShareModule;

fn hook(side: HookSide, description: &str) -> HookDefinition {
    HookDefinition {
        side,
        description: description.to_string(),
        ..Default::default()
    }
}

/// Share links for a post.
pub fn share_urls(base_url: &str, post: &Value) -> Value {
    let id = post.get("id").and_then(Value::as_str).unwrap_or("new");
    let title = post
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("Check out this post!");
    let url = format!("{}/posts/{id}", base_url.trim_end_matches('/'));
    let text = format!("Check out this post: {title}");

    json!({
        "facebook": format!("https://www.facebook.com/sharer/sharer.php?u={url}"),
        "twitter": format!("https://twitter.com/intent/tweet?text={text}&url={url}"),
        "linkedin": format!("https://www.linkedin.com/sharing/share-offsite/?url={url}"),
        "whatsapp": format!("https://wa.me/?text={text} {url}"),
        "telegram": format!("https://t.me/share/url?url={url}&text={text}"),
        "reddit": format!("https://reddit.com/submit?url={url}&title={title}"),
        "pinterest": format!("https://pinterest.com/pin/create/button/?url={url}&description={text}"),
    })
}

fn platform_shares(post: &Value) -> Vec<(&'static str, u64)> {
    PLATFORMS
        .iter()
        .map(|p| {
            let shares = post
                .pointer(&format!("/social_meta/platform_shares/{p}"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            (*p, shares)
        })
        .collect()
}

/// Likes count once, shares two and a half times.
pub fn engagement_score(post: &Value) -> f64 {
    let likes = post.get("likes").and_then(Value::as_u64).unwrap_or(0) as f64;
    let shares: u64 = platform_shares(post).iter().map(|(_, n)| n).sum();
    ((likes + shares as f64 * 2.5) * 100.0).round() / 100.0
}

fn most_shared(post: &Value) -> &'static str {
    platform_shares(post)
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .max_by_key(|(_, n)| *n)
        .map(|(p, _)| p)
        .unwrap_or("none")
}

fn admin_menu() -> Arc<dyn HookHandler> {
    ClosureHandler::shared(|payload| async move {
        let mut items = payload.as_array().cloned().unwrap_or_default();
        if items.iter().any(|i| i["path"] == "/admin/social-share") {
            return Ok(HookAction::Continue);
        }
        items.push(json!({
            "title": "Social Share",
            "path": "/admin/social-share",
            "roles": ["admin", "editor"],
        }));
        Ok(HookAction::ContinueWith(Value::Array(items)))
    })
}

fn before_post_save(base_url: String) -> Arc<dyn HookHandler> {
    ClosureHandler::shared(move |post| {
        let base_url = base_url.clone();
        async move {
            let mut fields = Map::new();
            for counter in ["likes", "shares"] {
                if post.get(counter).is_none() {
                    fields.insert(counter.to_string(), json!(0));
                }
            }
            if post.get("social_meta").is_none() {
                let zeroes: Map<String, Value> =
                    PLATFORMS.iter().map(|p| (p.to_string(), json!(0))).collect();
                fields.insert(
                    "social_meta".to_string(),
                    json!({
                        "platform_shares": zeroes,
                        "share_urls": share_urls(&base_url, &post),
                    }),
                );
            }
            if fields.is_empty() {
                Ok(HookAction::Continue)
            } else {
                Ok(HookAction::ContinueWith(Value::Object(fields)))
            }
        }
    })
}

fn post_meta() -> Arc<dyn HookHandler> {
    ClosureHandler::shared(|payload| async move {
        let Some(post) = payload.get("post").filter(|p| p.get("id").is_some()) else {
            return Ok(HookAction::Continue);
        };
        let shares: u64 = platform_shares(post).iter().map(|(_, n)| n).sum();
        Ok(HookAction::ContinueWith(json!({
            "social_meta": {
                "likes": post.get("likes").and_then(Value::as_u64).unwrap_or(0),
                "shares": shares,
                "most_shared_platform": most_shared(post),
                "engagement_score": engagement_score(post),
            }
        })))
    })
}

impl PluginModule for SocialShareModule {
    fn id(&self) -> &'static str {
        ID
    }

    fn manifest(&self) -> PluginManifest {
        PluginManifest {
            id: Some(ID.to_string()),
            name: "Social Media Share & Like".to_string(),
            description: "Share buttons, like counters and engagement scoring for posts."
                .to_string(),
            version: "1.0.0".to_string(),
            author: "CMS Team".to_string(),
            category: "Social".to_string(),
            price: "Free".to_string(),
            features: vec![
                "Share links for seven platforms".to_string(),
                "Like and share counters".to_string(),
                "Engagement score".to_string(),
            ],
            hooks: [
                ("admin_menu", hook(HookSide::Frontend, "Add Social Share menu item")),
                ("before_post_save", hook(HookSide::Backend, "Initialize share counters")),
                ("post_meta", hook(HookSide::Frontend, "Engagement summary")),
            ]
            .into_iter()
            .map(|(name, def)| (name.to_string(), def.into()))
            .collect(),
            settings_schema: json!({
                "base_url": {"type": "string", "default": "https://example.com"}
            }),
            ..Default::default()
        }
    }

    fn handler(&self, hook: &HookPoint, settings: &Value) -> Option<Arc<dyn HookHandler>> {
        match hook {
            HookPoint::AdminMenu => Some(admin_menu()),
            HookPoint::BeforePostSave => {
                let base_url = settings
                    .get("base_url")
                    .and_then(Value::as_str)
                    .unwrap_or("https://example.com")
                    .to_string();
                Some(before_post_save(base_url))
            }
            HookPoint::PostMeta => Some(post_meta()),
            _ => None,
        }
    }
}
