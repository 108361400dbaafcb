//! POST /chat: answers one user message within a session.

use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::{debug, info};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::chat::chat_request::{ChatRequest, ChatResponse},
};

/// Handler: POST /chat
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/chat \
///   -H 'content-type: application/json' \
///   -d '{"query":"What IPTV packages do you offer?","session_id":"3f1c..."}'
/// ```
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    // Session ids are opaque keys: only reject blanks, never normalize.
    let session_id = body.session_id.as_str();
    if session_id.trim().is_empty() {
        return Err(AppError::BadRequest("`session_id` must not be empty".into()));
    }
    if body.query.trim().is_empty() {
        return Err(AppError::BadRequest("`query` must not be empty".into()));
    }

    debug!(session_id = %session_id, "chat: start");
    let answer = state.engine.answer(&body.query, session_id).await?;
    info!(session_id = %session_id, source = ?answer.source, "chat: answered");

    Ok(Json(ChatResponse {
        response: answer.text,
    }))
}
