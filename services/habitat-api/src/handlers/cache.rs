//! Raster cache management and catalog reload handlers.

use axum::{extract::Extension, Json};
use serde::Serialize;
use std::sync::Arc;
use storage::RasterCacheStats;
use tracing::{info, instrument};

use super::common::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    #[serde(flatten)]
    pub stats: RasterCacheStats,
    pub hit_rate_percent: f64,
    pub memory_mb: f64,
}

/// GET /api/cache/stats - Raster cache statistics
#[instrument(skip(state))]
pub async fn cache_stats_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<CacheStatsResponse> {
    let stats = state.raster_cache.stats();
    Json(CacheStatsResponse {
        hit_rate_percent: stats.hit_rate(),
        memory_mb: stats.estimated_memory_mb(),
        stats,
    })
}

/// POST /api/cache/clear - Drop every cached raster
#[instrument(skip(state))]
pub async fn cache_clear_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<serde_json::Value> {
    info!("Clearing raster cache");
    let removed = state.raster_cache.clear();
    state.metrics.record_raster_cache_stats(&state.raster_cache.stats());

    Json(serde_json::json!({ "cleared": removed }))
}

/// POST /api/catalog/reload - Re-read the layer catalog
#[instrument(skip(state))]
pub async fn catalog_reload_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    info!("Reloading layer catalog");
    let factors = state.reload_catalog().await?;

    Ok(Json(serde_json::json!({ "factors": factors })))
}
