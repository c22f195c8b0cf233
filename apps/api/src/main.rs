mod config;
mod errors;
mod extract;
mod llm_client;
mod models;
mod routes;
mod state;
mod summarize;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extract::DocumentExtractor;
use crate::llm_client::build_generator;
use crate::routes::build_router;
use crate::state::AppState;
use crate::summarize::Summarizer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Extractor API v{}", env!("CARGO_PKG_VERSION"));

    // Construct the model backend eagerly: a missing credential or unknown
    // provider fails the boot, not a request.
    let generator = build_generator(&config)?;
    info!("model backend initialized (provider: {})", config.ai_provider);

    let extractor = Arc::new(DocumentExtractor::new());
    if !extract::ocr::tesseract_available() {
        warn!("tesseract binary not found; OCR fallback unavailable for scanned documents");
    }

    let summarizer = Summarizer::new(generator);

    // Build app state
    let state = AppState {
        extractor,
        summarizer,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
