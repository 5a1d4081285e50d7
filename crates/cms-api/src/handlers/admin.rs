//! Admin menu and dashboard handlers.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde_json::Value;

use cms_plugin::compose::{DashboardView, MenuItem};

use crate::dto::ActivityQuery;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/admin/menu
pub async fn menu(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<MenuItem>>, ApiError> {
    Ok(Json(state.dashboard.menu(&auth).await?))
}

/// GET /api/dashboard/stats
pub async fn dashboard_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DashboardView>, ApiError> {
    Ok(Json(state.dashboard.dashboard(&auth).await?))
}

/// GET /api/dashboard/activity
pub async fn activity(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<ActivityQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.dashboard.activity(&auth, query.limit).await?))
}

/// GET /api/dashboard/quick-stats
pub async fn quick_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.dashboard.quick_stats(&auth).await?))
}
