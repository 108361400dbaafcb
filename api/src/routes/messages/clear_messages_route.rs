use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use tracing::info;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::messages::messages_response::{ClearMessagesResponse, SessionQuery},
};

/// Handler: DELETE /clear_messages?session_id=...
///
/// Unknown sessions are reported as 404.
pub async fn clear_messages(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SessionQuery>,
) -> AppResult<Json<ClearMessagesResponse>> {
    let session_id = q.session_id.as_str();
    if session_id.trim().is_empty() {
        return Err(AppError::BadRequest("`session_id` must not be empty".into()));
    }

    state.store.clear(session_id).await?;
    info!(session_id = %session_id, "clear_messages: cleared");

    Ok(Json(ClearMessagesResponse {
        message: format!("Chat history cleared for session `{session_id}`."),
    }))
}
