//! HTTP API gateway for Onboarding Buddy.
//!
//! Exposes a health check and the v1 session API. Every session lives in
//! memory behind its own lock; transcripts are written to the configured
//! log directory.
//!
//! Built on Axum.

pub mod api_v1;

use axum::extract::DefaultBodyLimit;
use axum::{Router, response::Json, routing::get};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use buddy_agent::OnboardingBuddy;
use buddy_session::PasswordGate;

/// Build the full router: `/health` plus the v1 API nested under `/v1`.
///
/// Layers applied:
/// - Request body size limit (64 KB)
/// - HTTP trace logging
pub fn build_router(api_state: api_v1::SharedApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router(api_state))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// The knowledge index starts building in the background so the first
/// question does not pay for it.
pub async fn start(config: buddy_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let secrets = config.require_secrets()?;
    config.require_source_document()?;

    let host = config.gateway.host.clone();
    let port = config.gateway.port;
    let addr = format!("{host}:{port}");

    let provider = buddy_providers::build_from_config(&config, &secrets.api_key);
    let buddy = Arc::new(OnboardingBuddy::from_config(&config, provider)?);
    let gate = Arc::new(PasswordGate::new(&secrets.access_password));

    let warmup = buddy.clone();
    tokio::spawn(async move {
        match warmup.knowledge().index().await {
            Ok(index) => info!(chunks = index.len(), "Knowledge index built"),
            Err(e) => warn!(error = %e, "Knowledge index build failed; will retry on first question"),
        }
    });

    let api_state = Arc::new(api_v1::ApiV1State::new(buddy, gate));
    let app = build_router(api_state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}
