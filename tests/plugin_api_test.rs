//! API tests for the plugin lifecycle and hook execution.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use cms_entity::user::UserRole;

fn menu_paths(body: &serde_json::Value) -> Vec<String> {
    body.as_array()
        .expect("menu is an array")
        .iter()
        .map(|item| item["path"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_catalogue_is_seeded() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();

    let response = app.request("GET", "/api/plugins", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    let ids: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"social-share"));
    assert!(ids.contains(&"seo-optimizer"));

    let response = app
        .request("GET", "/api/plugins?category=Social", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .body
            .as_array()
            .unwrap()
            .iter()
            .all(|p| p["category"] == "Social")
    );
}

#[tokio::test]
async fn test_activation_is_idempotent_and_reversible() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();

    let base = app.request("GET", "/api/admin/menu", None, Some(&token)).await;
    assert_eq!(base.status, StatusCode::OK);
    assert!(!menu_paths(&base.body).contains(&"/admin/social-share".to_string()));

    for _ in 0..2 {
        let response = app
            .request("POST", "/api/plugins/social-share/activate", None, Some(&token))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["plugin"]["status"], "active");
    }

    let menu = app.request("GET", "/api/admin/menu", None, Some(&token)).await;
    let paths = menu_paths(&menu.body);
    assert_eq!(
        paths.iter().filter(|p| *p == "/admin/social-share").count(),
        1
    );
    let entry = menu
        .body
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["path"] == "/admin/social-share")
        .unwrap();
    assert_eq!(entry["icon"], "Puzzle");

    let response = app
        .request("PUT", "/api/plugins/social-share/deactivate", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["plugin"]["status"], "installed");

    let after = app.request("GET", "/api/admin/menu", None, Some(&token)).await;
    assert_eq!(after.body, base.body);
}

#[tokio::test]
async fn test_activate_unknown_plugin_is_not_found() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();

    let response = app
        .request("POST", "/api/plugins/ghost/activate", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");

    let active = app
        .request("GET", "/api/plugins/active", None, Some(&token))
        .await;
    assert_eq!(active.body, json!([]));
}

#[tokio::test]
async fn test_lifecycle_requires_admin() {
    let app = helpers::TestApp::new().await;
    let editor = app.token("editor-1", UserRole::Editor);

    let response = app
        .request("POST", "/api/plugins/social-share/activate", None, Some(&editor))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("POST", "/api/plugins/social-share/activate", None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            "POST",
            "/api/plugins/social-share/activate",
            None,
            Some("not-a-token"),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_install_manifest_then_dispatch() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();

    let manifest = json!({
        "name": "Banner",
        "description": "Adds a banner",
        "version": "0.1.0",
        "author": "Tests",
        "hooks": {
            "post_content": {
                "type": "frontend",
                "description": "Banner above posts",
                "action": {"kind": "merge_fields", "fields": {"banner": "Hello"}}
            }
        }
    });
    let response = app
        .request("POST", "/api/plugins", Some(manifest.clone()), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["plugin"]["id"], "banner");
    assert_eq!(response.body["plugin"]["status"], "installed");

    let duplicate = app
        .request("POST", "/api/plugins", Some(manifest), Some(&token))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    app.request("POST", "/api/plugins/banner/activate", None, Some(&token))
        .await;

    let response = app
        .request(
            "POST",
            "/api/plugins/execute-hook",
            Some(json!({"hook_name": "post_content", "data": {"post": {"id": "p1"}}})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["banner"], "Hello");
    assert_eq!(response.body["data"]["post"]["id"], "p1");
    assert_eq!(response.body["executed_hooks"][0]["plugin_id"], "banner");
    assert_eq!(response.body["executed_hooks"][0]["success"], true);

    let hooks = app
        .request("GET", "/api/plugins/hooks", None, Some(&token))
        .await;
    assert_eq!(hooks.body[0]["hook"], "post_content");
}

#[tokio::test]
async fn test_invalid_manifest_is_rejected() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();

    let response = app
        .request(
            "POST",
            "/api/plugins",
            Some(json!({"name": "", "description": "x", "version": "1", "author": "a"})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_execute_hook_without_handlers_is_identity() {
    let app = helpers::TestApp::new().await;
    let token = app.token("author-1", UserRole::Author);
    let data = json!({"anything": [1, 2, 3]});

    let response = app
        .request(
            "POST",
            "/api/plugins/execute-hook",
            Some(json!({"hook_name": "my_custom_hook", "data": data})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"], data);
    assert_eq!(response.body["executed_hooks"], json!([]));
}

#[tokio::test]
async fn test_settings_round_trip_and_uninstall() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();

    let response = app
        .request("GET", "/api/plugins/social-share/settings", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["settings"]["base_url"], "https://example.com");

    let response = app
        .request(
            "PUT",
            "/api/plugins/social-share/settings",
            Some(json!({"settings": "not an object"})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "PUT",
            "/api/plugins/social-share/settings",
            Some(json!({"settings": {"base_url": "https://cms.test"}})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["plugin"]["settings"]["base_url"],
        "https://cms.test"
    );

    let response = app
        .request("DELETE", "/api/plugins/social-share", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", "/api/plugins/social-share", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
