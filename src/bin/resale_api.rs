//! HDB Resale Price Estimator API Server
//!
//! REST API serving resale price estimates
//!
//! Usage:
//!   cargo run --bin resale_api
//!
//! Environment:
//!   RESALE_MODEL_PATH   - Model artifact (default: best_model.json)
//!   RESALE_OPTIONS_PATH - Option catalog JSON (default: built-in lists)
//!   PORT / RESALE_PORT  - Server port (default: 8080)
//!   RESALE_HOST         - Server host (default: 0.0.0.0)
//!   RUST_LOG            - Log level (default: info)

use resale_estimator::api::middleware::{RateLimitConfig, RateLimiter};
use resale_estimator::api::{create_router, handlers::AppState, start_cleanup_task};
use resale_estimator::utils::constants::{APP_NAME, APP_VERSION};
use resale_estimator::{AppConfig, Estimator, ModelStore, Predictor, TelemetryCollector};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    info!("{} API v{}", APP_NAME, APP_VERSION);

    let config = AppConfig::from_env()?;
    let addr = config.bind_addr()?;
    let catalog = config.load_catalog()?;

    // Load the model up front: a broken artifact stops the process here
    let store = ModelStore::new(config.model_path.clone());
    let predictor = Predictor::new(store.get()?);
    info!(
        "Model '{}' v{} loaded from {}",
        predictor.model_name(),
        predictor.model_version(),
        store.path().display()
    );

    let estimator = Estimator::new(Arc::new(catalog), predictor);

    // Initialize telemetry
    let telemetry = Arc::new(TelemetryCollector::new());
    let telemetry_for_shutdown = telemetry.clone();

    let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        trust_forwarded_headers: config.trust_proxy,
        ..RateLimitConfig::default()
    }));
    if config.trust_proxy {
        info!("Rate limits keyed on x-forwarded-for / x-real-ip");
    }

    let state = Arc::new(AppState::new(estimator, telemetry).with_rate_limiter(rate_limiter.clone()));

    // Start background cleanup task for rate limiter
    start_cleanup_task(rate_limiter);

    let app = create_router(state);

    info!("API starting on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /v1/estimate  - Estimate a resale price");
    info!("  GET  /v1/options   - Selectable towns, flat types, models, storeys");
    info!("  GET  /v1/stats     - Request statistics");
    info!("  GET  /v1/health    - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    // Peer addresses feed the rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Shutdown signal received, exporting telemetry...");
    let stats = telemetry_for_shutdown.get_stats();
    info!("   Total requests: {}", stats.total_requests);
    info!("   Estimates served: {}", stats.total_estimates);
    info!("   Rejected: {}", stats.total_rejected);

    match telemetry_for_shutdown.export_stats_json() {
        Ok(path) => info!("   Stats exported to: {}", path.display()),
        Err(e) => warn!("   Failed to export stats: {}", e),
    }

    info!("{} API shutdown complete", APP_NAME);

    Ok(())
}
