//! Route definitions for the CMS Pro HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to handlers via Axum's `State` extractor.

use axum::Router;
use axum::middleware as axum_middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(plugin_routes())
        .merge(admin_routes())
        .merge(post_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Liveness endpoints.
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
}

/// Plugin catalogue, lifecycle, settings and hook execution.
fn plugin_routes() -> Router<AppState> {
    use handlers::plugins;

    Router::new()
        .route(
            "/plugins",
            get(plugins::list_plugins).post(plugins::install_plugin),
        )
        .route("/plugins/active", get(plugins::list_active))
        .route("/plugins/hooks", get(plugins::frontend_hooks))
        .route(
            "/plugins/execute-hook",
            post(handlers::hooks::execute_hook),
        )
        .route(
            "/plugins/{id}",
            get(plugins::get_plugin).delete(plugins::uninstall_plugin),
        )
        .route("/plugins/{id}/install", post(plugins::install_available))
        .route(
            "/plugins/{id}/activate",
            post(plugins::activate_plugin).put(plugins::activate_plugin),
        )
        .route(
            "/plugins/{id}/deactivate",
            post(plugins::deactivate_plugin).put(plugins::deactivate_plugin),
        )
        .route(
            "/plugins/{id}/settings",
            get(plugins::get_settings).put(plugins::update_settings),
        )
}

/// Composed admin views.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/menu", get(handlers::admin::menu))
        .route("/dashboard/stats", get(handlers::admin::dashboard_stats))
        .route("/dashboard/activity", get(handlers::admin::activity))
        .route("/dashboard/quick-stats", get(handlers::admin::quick_stats))
}

/// Posts.
fn post_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/posts",
            get(handlers::posts::list_posts).post(handlers::posts::create_post),
        )
        .route("/posts/{id}", get(handlers::posts::get_post))
}
