//! Health checks, metrics, and monitoring endpoints.

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::instrument;

use crate::state::AppState;

// ============================================================================
// Health Checks
// ============================================================================

/// GET /health - Basic health check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /ready - Readiness check (catalog loaded, base raster and output
/// directory still present)
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    let catalog_loaded = !state.catalog().await.is_empty();
    let base_present = state.config.base_raster.is_file();
    let output_present = state.pipeline.emitter().dir().is_dir();

    if catalog_loaded && base_present && output_present {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
    }
}

// ============================================================================
// Prometheus Metrics
// ============================================================================

/// GET /metrics - Prometheus metrics endpoint
#[instrument(skip(state, prometheus))]
pub async fn metrics_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(prometheus): Extension<PrometheusHandle>,
) -> impl IntoResponse {
    state.metrics.record_raster_cache_stats(&state.raster_cache.stats());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        prometheus.render(),
    )
}

// ============================================================================
// JSON Metrics API
// ============================================================================

/// GET /api/metrics - JSON metrics for the UI
#[instrument(skip(state))]
pub async fn api_metrics_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let snapshot = state.metrics.snapshot();
    let cache = state.raster_cache.stats();
    let factors = state.catalog().await.len();

    Json(serde_json::json!({
        "pipeline": snapshot,
        "raster_cache": {
            "hits": cache.hits,
            "misses": cache.misses,
            "entries": cache.entries,
            "hit_rate_percent": cache.hit_rate(),
            "memory_mb": cache.estimated_memory_mb()
        },
        "catalog": {
            "factors": factors
        }
    }))
}
