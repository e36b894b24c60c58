// =============================================================================
// HANDLERS MODULE
// =============================================================================
// HTTP request handlers (controller layer). Handlers stay thin: extract the
// query-string parameters, invoke a query builder on the shared pool, and
// serialize the result. Any escaped error converts through AppError's
// IntoResponse impl.
// =============================================================================

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::*;
use crate::AppState;

// =============================================================================
// HEALTH ENDPOINTS
// =============================================================================

/// Liveness probe - if we can respond, we're alive.
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "joyas-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Database connectivity check - round-trips `SELECT NOW()` and echoes the
/// server clock.
///
/// GET /
pub async fn connection_check(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ConnectionCheckResponse>> {
    let timestamp = state.db.server_time().await?;

    Ok(Json(ConnectionCheckResponse {
        status: "ok".to_string(),
        timestamp,
    }))
}

// =============================================================================
// METRICS ENDPOINT
// =============================================================================
/// Prometheus metrics in text exposition format.
///
/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}

// =============================================================================
// INVENTORY API ENDPOINTS
// =============================================================================

/// Paginated, sorted inventory listing.
///
/// GET /joyas?limit=5&page=2&order_by=precio_DESC
///
/// # Response
/// ```json
/// {
///   "totalJoyas": 12,
///   "stockTotal": 53,
///   "results": [{ "name": "Anillo solitario", "href": "/joyas/joya/1" }]
/// }
/// ```
pub async fn list_joyas(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ListingResponse>> {
    let start = Instant::now();

    let listing = state.db.list_joyas(&params).await?;

    let duration = start.elapsed().as_secs_f64();
    metrics::record_http_request("GET", "/joyas", 200, duration);
    metrics::record_db_query("select", duration);
    metrics::set_stock_total(listing.stock_total);

    Ok(Json(listing))
}

/// Criteria-filtered inventory rows, unpaginated.
///
/// GET /joyas/filtros?precio_min=25000&precio_max=60000&categoria=anillos&metal=oro
///
/// Responds with the raw row array; all values reach the query as bound
/// parameters.
pub async fn filter_joyas(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> AppResult<Json<Vec<Joya>>> {
    let start = Instant::now();

    tracing::info!(
        precio_min = ?params.precio_min,
        precio_max = ?params.precio_max,
        categoria = ?params.categoria,
        metal = ?params.metal,
        "Filter request received"
    );

    let joyas = state.db.filter_joyas(&params).await?;

    let duration = start.elapsed().as_secs_f64();
    metrics::record_http_request("GET", "/joyas/filtros", 200, duration);
    metrics::record_db_query("select", duration);

    Ok(Json(joyas))
}

/// Single item detail - the target of the listing's HATEOAS links.
///
/// GET /joyas/joya/:id
///
/// # Response
/// - 200 OK: full inventory row
/// - 404 Not Found: no row with that id
pub async fn get_joya(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Joya>> {
    let start = Instant::now();

    let joya = state
        .db
        .get_joya(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("joya not found: {id}")))?;

    let duration = start.elapsed().as_secs_f64();
    metrics::record_http_request("GET", "/joyas/joya/:id", 200, duration);
    metrics::record_db_query("select", duration);

    Ok(Json(joya))
}
