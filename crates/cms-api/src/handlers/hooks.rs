//! Ad hoc hook execution.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use tracing::debug;

use cms_core::error::AppError;
use cms_plugin::{DispatchOutcome, Dispatcher, HookPoint};

use crate::dto::HookExecution;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/plugins/execute-hook
///
/// Folds this node's registrations for `hook_name` over `data`. Always
/// dispatches in-process, so a node configured for remote dispatch can
/// still serve as the remote end.
pub async fn execute_hook(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<HookExecution>, JsonRejection>,
) -> Result<Json<DispatchOutcome>, ApiError> {
    let Json(req) = body?;
    let name = req.hook_name.trim();
    if name.is_empty() {
        return Err(AppError::validation("hook_name is required").into());
    }

    let hook = HookPoint::from(name);
    let outcome = state.local_dispatcher.dispatch(&hook, req.data).await;
    debug!(
        user_id = %auth.id,
        hook = %hook,
        handlers = outcome.executed.len(),
        "Hook executed on request"
    );
    Ok(Json(outcome))
}
