use std::{env, sync::Arc};

pub mod core;
mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

pub use crate::core::app_state::AppState;
pub use crate::error_handler::{AppError, AppResult};

use crate::{
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        chat::chat_route::chat,
        health_route::health,
        messages::{clear_messages_route::clear_messages, messages_route::get_messages},
    },
};

/// Builds the HTTP router over already-constructed components.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/messages", get(get_messages))
        .route("/clear_messages", delete(clear_messages))
        .route("/health", get(health))
        .layer(middleware::from_fn(json_error_mapper))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Builds every component from the environment and serves until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS").map_err(|_| AppError::MissingEnv("API_ADDRESS"))?;

    let state = Arc::new(AppState::from_env().await?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "ClassyBot API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
