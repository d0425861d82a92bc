//! Story server binary.
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run -p story-server
//! ```

use anyhow::Context;
use std::sync::Arc;
use story_core::{GeminiModel, StoryService};
use story_server::{router, AppState, ServerConfig, DEFAULT_LOG_FILTER};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let model = GeminiModel::new(config.gemini_client());
    let service = StoryService::new(Arc::new(model));
    let model_name = service.model_name().to_string();
    let app = router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, model = %model_name, "story server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("story server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}
