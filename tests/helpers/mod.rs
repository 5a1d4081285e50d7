//! Shared test helpers for API tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use cms_api::{AppState, Stores};
use cms_core::config::AppConfig;
use cms_entity::user::{UserContext, UserRole};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for direct access to the plugin manager
    pub state: AppState,
}

impl TestApp {
    /// Create a test application over in-memory stores with the bundled
    /// catalogue seeded.
    pub async fn new() -> Self {
        let config = AppConfig::from_toml(
            r#"
            [auth]
            jwt_secret = "test-secret"

            [plugins]
            auto_load = false
            seed_catalog = true
            handler_timeout_ms = 200
            "#,
        )
        .expect("Failed to parse test config");

        let state = cms_api::build_state(config, Stores::in_memory())
            .await
            .expect("Failed to build state");
        let router = cms_api::build_app(state.clone());

        Self { router, state }
    }

    /// Issue a bearer token for a user with `role`
    pub fn token(&self, id: &str, role: UserRole) -> String {
        let user = UserContext::new(id, format!("{role} user"), role);
        self.state.jwt.issue(&user).expect("Failed to issue token")
    }

    /// Token for an admin
    pub fn admin_token(&self) -> String {
        self.token("admin-1", UserRole::Admin)
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
