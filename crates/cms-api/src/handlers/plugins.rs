//! Plugin catalogue and lifecycle handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::info;

use cms_core::error::AppError;
use cms_entity::plugin::{PluginManifest, PluginRecord, PluginStatus};
use cms_plugin::manager::FrontendHook;
use cms_plugin::registry::PluginQuery;

use crate::dto::{MessageResponse, PluginActionResponse, SettingsBody};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

/// GET /api/plugins
pub async fn list_plugins(
    State(state): State<AppState>,
    _auth: AuthUser,
    query: Result<Query<PluginQuery>, QueryRejection>,
) -> Result<Json<Vec<PluginRecord>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.plugins.registry().search(&query).await?))
}

/// GET /api/plugins/active
pub async fn list_active(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<PluginRecord>>, ApiError> {
    let active = state
        .plugins
        .registry()
        .list_by_status(PluginStatus::Active)
        .await?;
    Ok(Json(active))
}

/// GET /api/plugins/hooks
pub async fn frontend_hooks(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<FrontendHook>>, ApiError> {
    Ok(Json(state.plugins.frontend_hooks().await?))
}

/// GET /api/plugins/{id}
pub async fn get_plugin(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PluginRecord>, ApiError> {
    Ok(Json(state.plugins.registry().get(&id).await?))
}

/// POST /api/plugins
///
/// Installs a plugin from its manifest. The plugin starts `installed`.
pub async fn install_plugin(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<PluginManifest>, JsonRejection>,
) -> Result<(StatusCode, Json<PluginActionResponse>), ApiError> {
    require_admin(&auth)?;
    let Json(manifest) = body?;
    let plugin = state.plugins.install(manifest).await?;
    info!(plugin_id = %plugin.id, user_id = %auth.id, "Plugin installed from manifest");
    Ok((
        StatusCode::CREATED,
        Json(PluginActionResponse {
            message: format!("Plugin {} installed successfully", plugin.id),
            plugin,
        }),
    ))
}

/// POST /api/plugins/{id}/install
pub async fn install_available(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PluginActionResponse>, ApiError> {
    require_admin(&auth)?;
    let plugin = state.plugins.install_available(&id).await?;
    Ok(Json(PluginActionResponse {
        message: format!("Plugin {id} installed successfully"),
        plugin,
    }))
}

/// POST|PUT /api/plugins/{id}/activate
pub async fn activate_plugin(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PluginActionResponse>, ApiError> {
    require_admin(&auth)?;
    let plugin = state.plugins.activate(&id).await?;
    info!(plugin_id = %id, user_id = %auth.id, "Plugin activated on request");
    Ok(Json(PluginActionResponse {
        message: format!("Plugin {id} activated successfully"),
        plugin,
    }))
}

/// POST|PUT /api/plugins/{id}/deactivate
pub async fn deactivate_plugin(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PluginActionResponse>, ApiError> {
    require_admin(&auth)?;
    let plugin = state.plugins.deactivate(&id).await?;
    info!(plugin_id = %id, user_id = %auth.id, "Plugin deactivated on request");
    Ok(Json(PluginActionResponse {
        message: format!("Plugin {id} deactivated successfully"),
        plugin,
    }))
}

/// DELETE /api/plugins/{id}
pub async fn uninstall_plugin(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&auth)?;
    state.plugins.uninstall(&id).await?;
    Ok(Json(MessageResponse::plugin(
        &id,
        format!("Plugin {id} uninstalled successfully"),
    )))
}

/// GET /api/plugins/{id}/settings
pub async fn get_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SettingsBody>, ApiError> {
    require_admin(&auth)?;
    let settings = state.plugins.registry().settings(&id).await?;
    Ok(Json(SettingsBody { settings }))
}

/// PUT /api/plugins/{id}/settings
pub async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    body: Result<Json<SettingsBody>, JsonRejection>,
) -> Result<Json<PluginActionResponse>, ApiError> {
    require_admin(&auth)?;
    let Json(body) = body?;
    if !body.settings.is_object() {
        return Err(AppError::validation("settings must be a JSON object").into());
    }
    let plugin = state.plugins.update_settings(&id, body.settings).await?;
    Ok(Json(PluginActionResponse {
        message: "Plugin settings updated successfully".to_string(),
        plugin,
    }))
}
