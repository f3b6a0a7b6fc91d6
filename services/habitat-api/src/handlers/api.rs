//! REST API handlers for the map UI.
//!
//! Provides endpoints for:
//! - Listing the selectable factors
//! - Sampling the legend colour bar

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    Json,
};
use habitat_common::HabitatError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

use super::common::ApiError;
use crate::config::{MAX_LEGEND_COLORS, MIN_LEGEND_COLORS};
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct FactorInfo {
    pub name: String,
    pub comment: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FactorsResponse {
    pub factors: Vec<FactorInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LegendResponse {
    pub colormap: String,
    pub colors: Vec<String>,
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LegendQuery {
    pub colors: Option<usize>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/factors - Catalog entries in catalog order
#[instrument(skip(state))]
pub async fn factors_handler(Extension(state): Extension<Arc<AppState>>) -> Json<FactorsResponse> {
    let catalog = state.catalog().await;
    let factors = catalog
        .entries()
        .iter()
        .map(|entry| FactorInfo {
            name: entry.name.clone(),
            comment: entry.comment.clone(),
        })
        .collect();

    Json(FactorsResponse { factors })
}

/// GET /api/legend?colors=N - Hex colours sampled evenly from the colormap
#[instrument(skip(state, query))]
pub async fn legend_handler(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<LegendQuery>, QueryRejection>,
) -> Result<Json<LegendResponse>, ApiError> {
    let Query(query) = query?;
    let count = query.colors.unwrap_or(state.config.legend_colors);

    if !(MIN_LEGEND_COLORS..=MAX_LEGEND_COLORS).contains(&count) {
        return Err(HabitatError::invalid_parameter(
            "colors",
            format!(
                "must be between {} and {}, got {}",
                MIN_LEGEND_COLORS, MAX_LEGEND_COLORS, count
            ),
        )
        .into());
    }

    let colormap = state.pipeline.colormap();
    Ok(Json(LegendResponse {
        colormap: colormap.name().to_string(),
        colors: colormap.sample_hex(count),
    }))
}
