//! Menu and dashboard composition.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use cms_core::error::AppError;
use cms_database::store::ContentCounts;
use cms_entity::user::{UserContext, UserRole};
use cms_plugin::compose::{Icon, MenuItem, RoleAuthorizer};
use cms_plugin::hooks::registry::HookRegistry;
use cms_plugin::{ClosureHandler, DashboardComposer, HookAction, HookPoint, LocalDispatcher, MenuComposer};

fn setup() -> (Arc<HookRegistry>, Arc<LocalDispatcher>) {
    let registry = Arc::new(HookRegistry::new());
    let dispatcher = Arc::new(LocalDispatcher::with_timeout(
        Arc::clone(&registry),
        Duration::from_millis(200),
    ));
    (registry, dispatcher)
}

fn admin() -> UserContext {
    UserContext::new("u1", "Admin", UserRole::Admin)
}

fn author() -> UserContext {
    UserContext::new("u3", "Author", UserRole::Author)
}

#[tokio::test]
async fn test_menu_reattaches_icons_and_filters_roles() {
    let (registry, dispatcher) = setup();
    registry
        .register(
            "social-share",
            HookPoint::AdminMenu,
            ClosureHandler::shared(|payload| async move {
                let mut items = payload.as_array().cloned().unwrap_or_default();
                assert!(items.iter().all(|i| i.get("icon").is_none()));
                items.push(json!({
                    "title": "Social Share",
                    "path": "/admin/social-share",
                    "roles": ["admin", "editor"],
                    "badge": "new"
                }));
                Ok(HookAction::ContinueWith(Value::Array(items)))
            }),
            0,
        )
        .await;

    let composer = MenuComposer::new(dispatcher, Arc::new(RoleAuthorizer));
    let base = vec![
        MenuItem::new("Dashboard", "/admin", &[UserRole::Admin, UserRole::Editor, UserRole::Author], Icon::LayoutDashboard),
        MenuItem::new("Plugins", "/admin/plugins", &[UserRole::Admin], Icon::Puzzle),
    ];

    let menu = composer.compose(&base, &admin()).await.unwrap();
    assert_eq!(menu.len(), 3);
    assert_eq!(menu[0].icon, Icon::LayoutDashboard);
    assert_eq!(menu[2].entry.title, "Social Share");
    assert_eq!(menu[2].icon, Icon::Puzzle);
    assert_eq!(menu[2].entry.extra["badge"], "new");

    let menu = composer.compose(&base, &author()).await.unwrap();
    let titles: Vec<&str> = menu.iter().map(|m| m.entry.title.as_str()).collect();
    assert_eq!(titles, vec!["Dashboard"]);
}

#[tokio::test]
async fn test_menu_survives_broken_handler() {
    let (registry, dispatcher) = setup();
    registry
        .register(
            "broken",
            HookPoint::AdminMenu,
            ClosureHandler::shared(|_| async { Err(AppError::plugin("nope")) }),
            0,
        )
        .await;

    let composer = MenuComposer::new(dispatcher, Arc::new(RoleAuthorizer));
    let menu = composer
        .compose(&MenuComposer::default_menu(), &admin())
        .await
        .unwrap();
    assert_eq!(menu, MenuComposer::default_menu());
}

#[tokio::test]
async fn test_dashboard_cards_and_activity() {
    let (registry, dispatcher) = setup();
    registry
        .register(
            "analytics",
            HookPoint::DashboardStats,
            ClosureHandler::shared(|payload| async move {
                assert_eq!(payload["currentUser"]["role"], "editor");
                let mut stats = payload["stats"].as_array().cloned().unwrap_or_default();
                stats.push(json!({"title": "Page Views", "value": 12000}));
                Ok(HookAction::ContinueWith(json!({
                    "stats": stats,
                    "recentActivity": [{"type": "analytics"}],
                    "analytics_enabled": true
                })))
            }),
            0,
        )
        .await;

    let editor = UserContext::new("u2", "Ed", UserRole::Editor);
    let counts = ContentCounts {
        posts: 4,
        pages: 2,
        published: 3,
        drafts: 3,
        authors: 2,
    };
    let base = DashboardComposer::base_cards(&counts, 1, &editor);
    assert_eq!(base.len(), 4);

    let view = DashboardComposer::new(dispatcher)
        .compose(&base, vec![json!({"type": "post"})], &editor)
        .await
        .unwrap();

    assert_eq!(view.stats.len(), 5);
    assert_eq!(view.stats[0].icon, Icon::FileText);
    assert_eq!(view.stats[4].card.title, "Page Views");
    assert_eq!(view.stats[4].icon, Icon::BarChart);
    assert_eq!(view.recent_activity, vec![json!({"type": "analytics"})]);
    assert_eq!(view.extra["analytics_enabled"], true);
    assert!(view.extra.get("currentUser").is_none());
}

#[tokio::test]
async fn test_handler_icons_serialize_once() {
    let (registry, dispatcher) = setup();
    registry
        .register(
            "social-share",
            HookPoint::AdminMenu,
            ClosureHandler::shared(|payload| async move {
                let mut items = payload.as_array().cloned().unwrap_or_default();
                items.push(json!({"title": "Social", "path": "/admin/social", "roles": [], "icon": "Share2"}));
                items.push(json!({"title": "Trends", "path": "/admin/trends", "roles": [], "icon": "TrendingUp"}));
                Ok(HookAction::ContinueWith(Value::Array(items)))
            }),
            0,
        )
        .await;
    registry
        .register(
            "analytics",
            HookPoint::DashboardStats,
            ClosureHandler::shared(|mut payload| async move {
                if let Some(stats) = payload["stats"].as_array_mut() {
                    stats.push(json!({"title": "Visitors", "value": 7, "icon": "TrendingUp"}));
                }
                Ok(HookAction::ContinueWith(payload))
            }),
            0,
        )
        .await;

    let menu = MenuComposer::new(dispatcher.clone(), Arc::new(RoleAuthorizer))
        .compose(&MenuComposer::default_menu(), &admin())
        .await
        .unwrap();
    let social = menu.iter().find(|m| m.entry.path == "/admin/social").unwrap();
    assert_eq!(social.icon, Icon::Puzzle);
    assert!(social.entry.extra.get("icon").is_none());
    let trends = menu.iter().find(|m| m.entry.path == "/admin/trends").unwrap();
    assert_eq!(trends.icon, Icon::TrendingUp);

    let rendered = serde_json::to_string(social).unwrap();
    assert_eq!(rendered.matches("\"icon\"").count(), 1);
    let reparsed: Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(reparsed["icon"], "Puzzle");

    let editor = UserContext::new("u2", "Ed", UserRole::Editor);
    let base = DashboardComposer::base_cards(&ContentCounts::default(), 0, &editor);
    let view = DashboardComposer::new(dispatcher)
        .compose(&base, Vec::new(), &editor)
        .await
        .unwrap();
    let visitors = view.stats.last().unwrap();
    assert_eq!(visitors.icon, Icon::TrendingUp);
    let rendered = serde_json::to_string(visitors).unwrap();
    assert_eq!(rendered.matches("\"icon\"").count(), 1);
}

#[test]
fn test_authors_do_not_get_users_card() {
    let cards = DashboardComposer::base_cards(&ContentCounts::default(), 0, &author());
    assert!(cards.iter().all(|c| c.card.title != "Users"));
}
