//! GET /messages: full stored history of a session.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use tracing::debug;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::messages::messages_response::{MessageItem, MessagesResponse, SessionQuery},
};

pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SessionQuery>,
) -> AppResult<Json<MessagesResponse>> {
    let session_id = q.session_id.as_str();
    if session_id.trim().is_empty() {
        return Err(AppError::BadRequest("`session_id` must not be empty".into()));
    }

    let turns = state.store.history(session_id).await?;
    debug!(session_id = %session_id, turns = turns.len(), "get_messages: loaded");

    Ok(Json(MessagesResponse {
        messages: turns.into_iter().map(MessageItem::from).collect(),
    }))
}
