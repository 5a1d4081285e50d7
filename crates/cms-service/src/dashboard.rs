//! Admin menu and dashboard views for a user.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::debug;

use cms_core::result::AppResult;
use cms_database::store::ContentFilter;
use cms_entity::content::ContentKind;
use cms_entity::plugin::PluginStatus;
use cms_entity::user::{UserContext, UserRole};
use cms_plugin::compose::{Authorizer, DashboardView, MenuItem, RoleAuthorizer};
use cms_plugin::{DashboardComposer, HookPoint, MenuComposer, PluginManager};

use crate::content::ContentService;

/// Number of content items shown in the activity feed.
pub const RECENT_ACTIVITY_LIMIT: i64 = 5;

/// Number of plugin activations shown in the activity feed.
pub const RECENT_PLUGIN_LIMIT: usize = 2;

/// Builds the menu and dashboard views.
#[derive(Debug, Clone)]
pub struct DashboardService {
    plugins: Arc<PluginManager>,
    content: ContentService,
    menu: MenuComposer,
    dashboard: DashboardComposer,
}

impl DashboardService {
    /// Creates the service, composing through the manager's dispatcher and
    /// checking menu roles with [`RoleAuthorizer`].
    pub fn new(plugins: Arc<PluginManager>, content: ContentService) -> Self {
        Self::with_authorizer(plugins, content, Arc::new(RoleAuthorizer))
    }

    /// Creates the service with a custom menu authorizer.
    pub fn with_authorizer(
        plugins: Arc<PluginManager>,
        content: ContentService,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        let dispatcher = Arc::clone(plugins.dispatcher());
        Self {
            menu: MenuComposer::new(Arc::clone(&dispatcher), authorizer),
            dashboard: DashboardComposer::new(dispatcher),
            plugins,
            content,
        }
    }

    /// The admin menu `user` sees.
    pub async fn menu(&self, user: &UserContext) -> AppResult<Vec<MenuItem>> {
        let items = self
            .menu
            .compose(&MenuComposer::default_menu(), user)
            .await?;
        debug!(user_id = %user.id, entries = items.len(), "Menu composed");
        Ok(items)
    }

    /// The dashboard `user` sees.
    pub async fn dashboard(&self, user: &UserContext) -> AppResult<DashboardView> {
        let counts = self.content.stats(user).await?;
        let mut active = self
            .plugins
            .registry()
            .list_by_status(PluginStatus::Active)
            .await?;
        let mut activity = self
            .content
            .recent_activity(user, RECENT_ACTIVITY_LIMIT)
            .await?;

        if user.role.is_editor_or_above() {
            active.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            activity.extend(active.iter().take(RECENT_PLUGIN_LIMIT).map(|plugin| {
                json!({
                    "type": "plugin",
                    "message": format!("Plugin '{}' was activated", plugin.name),
                    "time": plugin.updated_at.to_rfc3339(),
                    "icon": "Puzzle",
                })
            }));
        }

        let base = DashboardComposer::base_cards(&counts, active.len(), user);
        self.dashboard.compose(&base, activity, user).await
    }

    /// The activity feed folded through `activity_feed`. Pages only appear
    /// for editors and admins.
    pub async fn activity(&self, user: &UserContext, limit: i64) -> AppResult<Value> {
        let limit = limit.clamp(1, 100);
        let mut feed: Vec<Value> = Vec::new();

        let posts = self
            .content
            .list(
                user,
                ContentFilter {
                    kind: Some(ContentKind::Post),
                    limit: Some((limit / 2).max(1)),
                    ..Default::default()
                },
            )
            .await?;
        let pages = if user.role.is_editor_or_above() {
            self.content
                .list(
                    user,
                    ContentFilter {
                        kind: Some(ContentKind::Page),
                        limit: Some((limit / 4).max(1)),
                        ..Default::default()
                    },
                )
                .await?
        } else {
            Vec::new()
        };

        let mut items: Vec<_> = posts.iter().chain(pages.iter()).collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        for item in items.into_iter().take(limit as usize) {
            let (kind, label, icon, section) = match item.kind {
                ContentKind::Post => ("post_created", "post", "FileText", "posts"),
                ContentKind::Page => ("page_created", "page", "File", "pages"),
            };
            feed.push(json!({
                "id": item.id,
                "type": kind,
                "title": format!("New {label}: {}", item.title),
                "description": format!("Created by {}", item.author_id),
                "timestamp": item.created_at.to_rfc3339(),
                "icon": icon,
                "url": format!("/admin/{section}/{}", item.id),
            }));
        }

        let payload = json!({
            "activity_feed": feed,
            "current_user": user.to_hook_value(),
        });
        let outcome = self
            .plugins
            .dispatch(&HookPoint::ActivityFeed, payload)
            .await;
        Ok(outcome.data)
    }

    /// Role-dependent counters folded through `quick_stats`.
    pub async fn quick_stats(&self, user: &UserContext) -> AppResult<Value> {
        let counts = self.content.stats(user).await?;
        let mut stats = Map::new();
        if user.role == UserRole::Author {
            stats.insert("my_posts".into(), json!(counts.posts));
            stats.insert("my_published".into(), json!(counts.published));
        } else {
            stats.insert("total_posts".into(), json!(counts.posts));
            stats.insert("published".into(), json!(counts.published));
            stats.insert("drafts".into(), json!(counts.drafts));
            stats.insert("total_pages".into(), json!(counts.pages));
        }
        if user.role.is_admin() {
            let plugins = self.plugins.registry().list().await?;
            let active = plugins.iter().filter(|p| p.is_active()).count();
            stats.insert("authors".into(), json!(counts.authors));
            stats.insert("total_plugins".into(), json!(plugins.len()));
            stats.insert("active_plugins".into(), json!(active));
        }

        let payload = json!({
            "stats": stats,
            "current_user": user.to_hook_value(),
        });
        let outcome = self.plugins.dispatch(&HookPoint::QuickStats, payload).await;
        Ok(outcome.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use cms_database::{InMemoryContentStore, InMemoryPluginStore};
    use cms_entity::content::ContentDraft;
    use cms_plugin::modules::SocialShareModule;
    use cms_plugin::traits::PluginModule;
    use cms_plugin::{HookRegistry, PluginRegistry};

    async fn setup() -> (Arc<PluginManager>, DashboardService) {
        let registry = PluginRegistry::new(Arc::new(InMemoryPluginStore::new()))
            .with_modules([Arc::new(SocialShareModule) as Arc<dyn PluginModule>]);
        registry
            .seed(vec![SocialShareModule.manifest()])
            .await
            .unwrap();
        let manager = Arc::new(PluginManager::local(
            Arc::new(registry),
            Arc::new(HookRegistry::new()),
            Duration::from_millis(200),
        ));
        let content = ContentService::new(
            Arc::new(InMemoryContentStore::new()),
            Arc::clone(manager.dispatcher()),
        );
        let service = DashboardService::new(Arc::clone(&manager), content);
        (manager, service)
    }

    #[tokio::test]
    async fn test_menu_follows_activation() {
        let (manager, service) = setup().await;
        let admin = UserContext::new("u1", "Root", UserRole::Admin);

        let base = service.menu(&admin).await.unwrap();
        assert_eq!(base.len(), MenuComposer::default_menu().len());

        manager.activate("social-share").await.unwrap();
        let menu = service.menu(&admin).await.unwrap();
        assert_eq!(menu.len(), base.len() + 1);
        assert_eq!(menu.last().unwrap().entry.path, "/admin/social-share");

        let author = UserContext::new("u3", "Ann", UserRole::Author);
        let menu = service.menu(&author).await.unwrap();
        assert!(menu.iter().all(|m| m.entry.path != "/admin/social-share"));
        assert!(menu.iter().all(|m| m.entry.path != "/admin/plugins"));
    }

    #[tokio::test]
    async fn test_dashboard_counts_active_plugins() {
        let (manager, service) = setup().await;
        let admin = UserContext::new("u1", "Root", UserRole::Admin);
        manager.activate("social-share").await.unwrap();
        service
            .content
            .save_post(
                &admin,
                ContentDraft {
                    title: "First".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let view = service.dashboard(&admin).await.unwrap();
        let active = view
            .stats
            .iter()
            .find(|s| s.card.title == "Active Plugins")
            .unwrap();
        assert_eq!(active.card.value, 1);
        assert_eq!(view.recent_activity.len(), 2);
        assert_eq!(view.recent_activity[0]["type"], "post");
        assert_eq!(view.recent_activity[1]["type"], "plugin");
        assert_eq!(
            view.recent_activity[1]["message"],
            "Plugin 'Social Media Share & Like' was activated"
        );
    }

    #[tokio::test]
    async fn test_plugin_activations_hidden_from_authors() {
        let (manager, service) = setup().await;
        manager.activate("social-share").await.unwrap();

        let author = UserContext::new("u3", "Ann", UserRole::Author);
        let view = service.dashboard(&author).await.unwrap();
        assert!(view.recent_activity.iter().all(|a| a["type"] != "plugin"));

        let editor = UserContext::new("u2", "Ed", UserRole::Editor);
        let view = service.dashboard(&editor).await.unwrap();
        let plugins: Vec<&Value> = view
            .recent_activity
            .iter()
            .filter(|a| a["type"] == "plugin")
            .collect();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0]["icon"], "Puzzle");
    }

    #[tokio::test]
    async fn test_quick_stats_by_role() {
        let (_, service) = setup().await;
        let author = UserContext::new("u3", "Ann", UserRole::Author);
        let admin = UserContext::new("u1", "Root", UserRole::Admin);

        let stats = service.quick_stats(&author).await.unwrap();
        assert_eq!(stats["stats"]["my_posts"], 0);
        assert!(stats["stats"].get("total_plugins").is_none());
        assert_eq!(stats["current_user"]["role"], "author");

        let stats = service.quick_stats(&admin).await.unwrap();
        assert_eq!(stats["stats"]["total_plugins"], 1);
        assert_eq!(stats["stats"]["active_plugins"], 0);
    }

    #[tokio::test]
    async fn test_activity_feed_lists_recent_posts() {
        let (_, service) = setup().await;
        let editor = UserContext::new("u2", "Ed", UserRole::Editor);
        for title in ["One", "Two"] {
            service
                .content
                .save_post(
                    &editor,
                    ContentDraft {
                        title: title.into(),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let feed = service.activity(&editor, 10).await.unwrap();
        let entries = feed["activity_feed"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e["type"] == "post_created"));
    }
}
