//! Composite overlay handler.

use axum::{extract::rejection::JsonRejection, extract::Extension, Json};
use habitat_common::HabitatError;
use std::sync::Arc;
use tracing::{info, instrument};

use super::common::ApiError;
use crate::metrics::Timer;
use crate::rendering::{CompositeRequest, CompositeResult};
use crate::state::AppState;

/// POST /api/composite - Render the overlay for a factor selection
#[instrument(skip(state, body))]
pub async fn composite_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<CompositeRequest>, JsonRejection>,
) -> Result<Json<CompositeResult>, ApiError> {
    state.metrics.record_request();

    let result = match body {
        Ok(Json(request)) => run_pipeline(state.clone(), request).await,
        Err(rejection) => Err(ApiError::from(rejection)),
    };

    if let Err(err) = &result {
        state.metrics.record_error(err.code());
    }
    result.map(Json)
}

async fn run_pipeline(
    state: Arc<AppState>,
    request: CompositeRequest,
) -> Result<CompositeResult, ApiError> {
    info!(
        positive = ?request.positive_factors,
        negative = ?request.negative_factors,
        threshold = request.threshold_percent,
        "Composite request"
    );

    let catalog = state.catalog().await;
    let timer = Timer::start();

    let worker_state = state.clone();
    let result = tokio::task::spawn_blocking(move || worker_state.pipeline.run(&request, &catalog))
        .await
        .map_err(|e| HabitatError::Internal(format!("render task failed: {}", e)))??;

    if result.image_url.is_empty() {
        state.metrics.record_empty_selection();
    } else {
        state.metrics.record_render(timer.elapsed_us());
        state.metrics.record_raster_cache_stats(&state.raster_cache.stats());
    }

    Ok(result)
}
