use std::error::Error;

use ai_llm_service::telemetry;
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // `.env` is optional; real environment variables always win.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::INFO))
        .with(telemetry::layer())
        .init();

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => info!("no .env file, using process environment"),
        Err(e) => warn!(error = %e, "failed to parse .env"),
    }

    api::start().await?;

    Ok(())
}
