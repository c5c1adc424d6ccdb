//! talentscout HTTP server binary.
//!
//! Starts an axum HTTP server exposing screening sessions.
//!
//! # Environment Variables
//!
//! - `PORT` - HTTP port (default: 8080)
//! - `TALENTSCOUT_CONFIG` - Path to a YAML config file (optional)
//! - `TALENTSCOUT_DATA_DIR` - Directory for the transcript log
//! - `TALENTSCOUT_MODEL` - Default model, e.g. `ollama/llama3.2`
//! - `OLLAMA_BASE_URL` - Ollama server URL
//! - `TALENTSCOUT_SESSION_TTL_SECS` - Idle and ended session lifetime (default: 1800)
//! - `RUST_LOG` - Tracing filter (default: "info,talentscout=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use anyhow::Context;
use talentscout::server::{app_router, AppState};
use talentscout::ScreeningConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,talentscout=debug".into()),
        )
        .init();

    let config = ScreeningConfig::from_env(None).context("Failed to load configuration")?;
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = format!("0.0.0.0:{}", port);

    tracing::info!(
        records = %config.records_path().display(),
        default_model = %config.default_model,
        timeout_secs = config.request_timeout_secs,
        session_ttl_secs = config.session_ttl_secs,
        "configuration loaded"
    );

    let state = AppState::from_config(&config);
    state.spawn_sweeper();
    let app = app_router(state);

    tracing::info!("talentscout server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health                - liveness probe");
    tracing::info!("  GET    /personas              - interviewer personas");
    tracing::info!("  POST   /sessions              - start a screening");
    tracing::info!("  GET    /sessions/:id          - transcript and state");
    tracing::info!("  DELETE /sessions/:id          - discard a session");
    tracing::info!("  POST   /sessions/:id/messages - submit a candidate message");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
