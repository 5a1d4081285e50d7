//! Content analytics: a publishing velocity card, tracking metadata on save.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tracing::info;

use cms_database::store::{ContentFilter, ContentStore};
use cms_entity::content::ContentKind;
use cms_entity::plugin::{HookDefinition, HookSide, PluginManifest};

use crate::hooks::definitions::{HookAction, HookPoint};
use crate::hooks::registry::HookHandler;
use crate::traits::{ClosureHandler, PluginModule};

/// Plugin id.
pub const ID: &str = "custom-analytics";

const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Dashboard analytics backed by the content store.
#[derive(Debug, Clone)]
pub struct AnalyticsModule {
    content: Arc<dyn ContentStore>,
}

impl AnalyticsModule {
    /// Creates the module over a content store.
    pub fn new(content: Arc<dyn ContentStore>) -> Self {
        Self { content }
    }
}

fn dashboard_stats(content: Arc<dyn ContentStore>, window_days: i64) -> Arc<dyn HookHandler> {
    ClosureHandler::shared(move |payload| {
        let content = Arc::clone(&content);
        async move {
            let since = Utc::now() - Duration::days(window_days);
            let recent = content
                .list(&ContentFilter {
                    kind: Some(ContentKind::Post),
                    ..Default::default()
                })
                .await?
                .into_iter()
                .filter(|post| post.created_at >= since)
                .count();

            let mut stats = payload["stats"].as_array().cloned().unwrap_or_default();
            stats.push(json!({
                "title": "Content Velocity",
                "value": format!("{recent} posts"),
                "change": format!("last {window_days} days"),
                "changeType": if recent > 0 { "positive" } else { "neutral" },
            }));

            let mut activity = payload["recentActivity"]
                .as_array()
                .cloned()
                .unwrap_or_default();
            activity.insert(
                0,
                json!({
                    "type": "analytics",
                    "message": format!("{recent} posts created in the last {window_days} days"),
                    "time": Utc::now().to_rfc3339(),
                    "icon": "TrendingUp",
                }),
            );

            Ok(HookAction::ContinueWith(json!({
                "stats": stats,
                "recentActivity": activity,
            })))
        }
    })
}

fn before_post_save() -> Arc<dyn HookHandler> {
    ClosureHandler::shared(|post| async move {
        let now = Utc::now();
        let id = post.get("id").and_then(Value::as_str).unwrap_or("new");
        Ok(HookAction::ContinueWith(json!({
            "analytics": {
                "tracked": true,
                "tracking_id": format!("post_{id}_{}", now.timestamp()),
                "created_at": now.to_rfc3339(),
            }
        })))
    })
}

fn after_post_save() -> Arc<dyn HookHandler> {
    ClosureHandler::shared(|post| async move {
        let post_id = post.get("id").and_then(Value::as_str).unwrap_or_default();
        let title = post.get("title").and_then(Value::as_str).unwrap_or_default();
        let tracking_id = post
            .pointer("/analytics/tracking_id")
            .and_then(Value::as_str)
            .unwrap_or_default();
        info!(
            post_id,
            title,
            tracking_id,
            "Analytics recorded post save"
        );
        Ok(HookAction::Continue)
    })
}

fn hook(side: HookSide, description: &str) -> HookDefinition {
    HookDefinition {
        side,
        description: description.to_string(),
        ..Default::default()
    }
}

impl PluginModule for AnalyticsModule {
    fn id(&self) -> &'static str {
        ID
    }

    fn manifest(&self) -> PluginManifest {
        PluginManifest {
            id: Some(ID.to_string()),
            name: "Custom Analytics Dashboard".to_string(),
            description: "Publishing velocity on the dashboard and tracking metadata on posts."
                .to_string(),
            version: "1.0.0".to_string(),
            author: "CMS Team".to_string(),
            category: "Analytics".to_string(),
            price: "Free".to_string(),
            features: vec![
                "Content velocity card".to_string(),
                "Post tracking ids".to_string(),
            ],
            hooks: [
                ("dashboard_stats", hook(HookSide::Both, "Add content velocity card")),
                ("before_post_save", hook(HookSide::Backend, "Attach tracking metadata")),
                ("after_post_save", hook(HookSide::Backend, "Log saved posts")),
            ]
            .into_iter()
            .map(|(name, def)| (name.to_string(), def.into()))
            .collect(),
            settings_schema: json!({
                "window_days": {"type": "integer", "default": DEFAULT_WINDOW_DAYS}
            }),
            ..Default::default()
        }
    }

    fn handler(&self, hook: &HookPoint, settings: &Value) -> Option<Arc<dyn HookHandler>> {
        match hook {
            HookPoint::DashboardStats => {
                let window = settings
                    .get("window_days")
                    .and_then(Value::as_i64)
                    .filter(|d| *d > 0)
                    .unwrap_or(DEFAULT_WINDOW_DAYS);
                Some(dashboard_stats(Arc::clone(&self.content), window))
            }
            HookPoint::BeforePostSave => Some(before_post_save()),
            HookPoint::AfterPostSave => Some(after_post_save()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cms_database::InMemoryContentStore;
    use cms_entity::content::{Content, ContentStatus};
    use uuid::Uuid;

    fn post(days_ago: i64) -> Content {
        let created = Utc::now() - Duration::days(days_ago);
        Content {
            id: Uuid::new_v4(),
            kind: ContentKind::Post,
            title: "t".into(),
            content: String::new(),
            excerpt: None,
            status: ContentStatus::Published,
            author_id: "u1".into(),
            tags: vec![],
            category: None,
            slug: "t".into(),
            extra: json!({}),
            created_at: created,
            updated_at: created,
        }
    }

    #[tokio::test]
    async fn test_velocity_card_counts_window() {
        let store = Arc::new(InMemoryContentStore::new());
        store.insert(&post(1)).await.unwrap();
        store.insert(&post(3)).await.unwrap();
        store.insert(&post(30)).await.unwrap();

        let module = AnalyticsModule::new(store);
        let handler = module
            .handler(&HookPoint::DashboardStats, &json!({"window_days": 7}))
            .unwrap();
        let action = handler
            .handle(&json!({"stats": [{"title": "Total Posts"}], "recentActivity": []}))
            .await
            .unwrap();

        let HookAction::ContinueWith(out) = action else {
            panic!("expected stats");
        };
        assert_eq!(out["stats"][1]["title"], "Content Velocity");
        assert_eq!(out["stats"][1]["value"], "2 posts");
        assert_eq!(out["recentActivity"][0]["type"], "analytics");
    }

    #[tokio::test]
    async fn test_tracking_metadata() {
        let module = AnalyticsModule::new(Arc::new(InMemoryContentStore::new()));
        let action = module
            .handler(&HookPoint::BeforePostSave, &json!({}))
            .unwrap()
            .handle(&json!({"title": "Hello"}))
            .await
            .unwrap();
        let HookAction::ContinueWith(out) = action else {
            panic!("expected metadata");
        };
        assert_eq!(out["analytics"]["tracked"], true);
        assert!(
            out["analytics"]["tracking_id"]
                .as_str()
                .unwrap()
                .starts_with("post_new_")
        );
    }

    #[tokio::test]
    async fn test_after_save_logs_and_passes_through() {
        let module = AnalyticsModule::new(Arc::new(InMemoryContentStore::new()));
        let handler = module.handler(&HookPoint::AfterPostSave, &json!({})).unwrap();

        let saved = json!({
            "id": "p1",
            "title": "Hello",
            "analytics": {"tracking_id": "post_new_1"}
        });
        let action = handler.handle(&saved).await.unwrap();
        assert!(matches!(action, HookAction::Continue));

        let action = handler.handle(&json!({"title": 7})).await.unwrap();
        assert!(matches!(action, HookAction::Continue));
    }
}
