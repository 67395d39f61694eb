mod cache;
mod config;
mod errors;
mod extraction;
mod gemini;
mod matching;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::ResultCache;
use crate::config::Config;
use crate::extraction::HttpTextExtractor;
use crate::gemini::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvmatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Redis-backed result cache
    let redis = redis::Client::open(config.redis_url.clone())?;
    let cache = ResultCache::new(redis, config.cache_ttl_secs);
    info!("Result cache initialized (ttl: {}s)", config.cache_ttl_secs);

    // Initialize extraction client
    let extractor = Arc::new(HttpTextExtractor::new(
        config.extractor_url.clone(),
        config.call_timeout_secs,
    ));
    info!("Extraction client initialized ({})", config.extractor_url);

    // Initialize analysis client
    let analyzer = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.call_timeout_secs,
    ));
    info!("Analysis client initialized (model: {})", gemini::MODEL);

    // Build app state
    let state = AppState {
        extractor,
        analyzer,
        cache,
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
