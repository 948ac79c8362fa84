//! FinMentor HTTP Server
//!
//! Axum relay between the browser UI and the hosted model. The API key is
//! read here at startup and never leaves the process; requests carry their
//! own history, so nothing is kept between them.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finmentor_core::LlmProvider;
use finmentor_runtime::{GeminiConfig, GeminiProvider};

use crate::handlers::{
    chat_handler, health_check, list_models, market_update_handler, portfolio_chart_handler,
    portfolio_handler,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // A missing key is fatal: every route depends on it
    let config = GeminiConfig::from_env()?;
    let models = config.models.clone();
    let provider = Arc::new(GeminiProvider::from_config(config)?);

    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to Gemini"),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Gemini not reachable - replies will fall back");
            tracing::warn!("  Check API_KEY and network access");
        }
    }
    tracing::info!(
        flash = %models.flash,
        pro = %models.pro,
        image = %models.image,
        "Model set"
    );

    let app = app(AppState::new(provider, models));

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 FinMentor server running on http://{}", addr);
    tracing::info!("  GET  /health               - Health check");
    tracing::info!("  GET  /api/models           - List available models");
    tracing::info!("  POST /api/chat             - Chat turn");
    tracing::info!("  POST /api/market-update    - Market summary");
    tracing::info!("  POST /api/portfolio        - Generate portfolio");
    tracing::info!("  POST /api/portfolio/chart  - Portfolio pie chart image");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Router with every route, layer and the static UI bundle
fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/models", get(list_models))
        .route("/api/chat", post(chat_handler))
        .route("/api/market-update", post(market_update_handler))
        .route("/api/portfolio", post(portfolio_handler))
        .route("/api/portfolio/chart", post(portfolio_chart_handler))
        // Static files (WASM frontend)
        .fallback_service(ServeDir::new("static"))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
