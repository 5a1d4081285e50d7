//! Post handlers. Saving and rendering go through the content hooks.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::Value;
use uuid::Uuid;

use cms_database::store::ContentFilter;
use cms_entity::content::{Content, ContentDraft};

use crate::dto::PostQuery;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<ContentDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Content>), ApiError> {
    let Json(draft) = body?;
    let post = state.content.save_post(&auth, draft).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/posts
pub async fn list_posts(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<PostQuery>, QueryRejection>,
) -> Result<Json<Vec<Content>>, ApiError> {
    let Query(query) = query?;
    let filter = ContentFilter {
        kind: query.kind,
        status: query.status,
        author_id: None,
        limit: query.limit,
    };
    Ok(Json(state.content.list(&auth, filter).await?))
}

/// GET /api/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    _auth: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.content.render(id).await?))
}
