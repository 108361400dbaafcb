//! GET /health: LLM provider reachability.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use ai_llm_service::health_service::HealthStatus;

use crate::core::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `"ok"` when every profile is reachable, else `"degraded"`.
    pub status: &'static str,
    pub llm: Vec<HealthStatus>,
}

/// Always 200; probe failures are reported in the body.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let llm = state.llm.health_all().await;
    let status = if llm.iter().all(|h| h.ok) { "ok" } else { "degraded" };
    Json(HealthResponse { status, llm })
}
