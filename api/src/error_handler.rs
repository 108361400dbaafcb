use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use answer_engine::EngineError;
use chat_history::HistoryError;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("startup failed: {0}")]
    Startup(String),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Answer pipeline failure; `Display` is already user-safe.
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Conversation store error. Please try again later.")]
    Store { cause: String },
}

impl AppError {
    pub fn startup(err: impl ToString) -> Self {
        AppError::Startup(err.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,

            AppError::MissingEnv(_) | AppError::Startup(_) => StatusCode::INTERNAL_SERVER_ERROR, // startup-only
            AppError::Bind(_) | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Engine(_) | AppError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingEnv(_) => "MISSING_ENV",
            AppError::Startup(_) => "STARTUP_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Engine(EngineError::Fallback { .. }) => "LLM_FALLBACK_ERROR",
            AppError::Engine(_) => "RAG_PROCESSING_ERROR",
            AppError::Store { .. } => "STORE_ERROR",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            let cause = match &self {
                AppError::Engine(e) => e.cause().to_string(),
                AppError::Store { cause } => cause.clone(),
                other => other.to_string(),
            };
            error!(code = self.error_code(), %cause, "request failed");
        }
        let body = ErrorBody {
            error: self.error_code(),
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::NotFound(session_id) => {
                AppError::NotFound(format!("No chat history found for session `{session_id}`."))
            }
            other => AppError::Store {
                cause: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_500_with_distinct_codes() {
        let e = AppError::from(EngineError::processing("qdrant down"));
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.error_code(), "RAG_PROCESSING_ERROR");
        assert!(!e.to_string().contains("qdrant"));

        let e = AppError::from(EngineError::fallback("timeout"));
        assert_eq!(e.error_code(), "LLM_FALLBACK_ERROR");
    }

    #[test]
    fn history_not_found_is_404() {
        let e = AppError::from(HistoryError::NotFound("abc".into()));
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
        assert!(e.to_string().contains("abc"));

        let e = AppError::from(HistoryError::Backend("connection reset".into()));
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!e.to_string().contains("connection reset"));
    }
}
