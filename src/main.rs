// =============================================================================
// JOYAS SERVICE - Main Entry Point
// =============================================================================
// HTTP API over a PostgreSQL jewelry inventory:
// - GET /joyas           paginated, sorted listing with HATEOAS links
// - GET /joyas/filtros   parameterized filtering
// - GET /joyas/joya/:id  single item detail
// - GET /, /health       connectivity and liveness checks
// - GET /metrics         Prometheus exposition
// =============================================================================

mod config;
mod db;
mod error;
mod handlers;
mod metrics;
mod models;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::metrics::setup_metrics;

/// Shared state available to all request handlers. The pool inside
/// `Database` is the only cross-request resource; handlers hold no other
/// mutable state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // RUST_LOG controls levels, e.g. RUST_LOG=info,joyas_service=debug
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,joyas_service=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting Joyas Service...");

    let config = Config::from_env()?;
    info!(port = config.port, "Configuration loaded");

    let metrics_handle = setup_metrics()?;
    info!("Prometheus metrics initialized");

    let db = Database::connect(&config.database_url()).await?;
    info!("Connected to PostgreSQL");

    db.ensure_schema().await?;
    info!("Inventory schema ready");

    let state = Arc::new(AppState { db, metrics_handle });

    let app = Router::new()
        // ----- Health Endpoints -----
        .route("/", get(handlers::connection_check))
        .route("/health", get(handlers::health_check))
        // ----- Metrics Endpoint -----
        .route("/metrics", get(handlers::metrics_handler))
        // ----- Inventory API Endpoints -----
        .route("/joyas", get(handlers::list_joyas))
        .route("/joyas/filtros", get(handlers::filter_joyas))
        .route("/joyas/joya/:id", get(handlers::get_joya))
        // ----- Middleware Layers -----
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(address = %addr, "Joyas Service is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
