//! Habitat suitability overlay API service library.
//!
//! This module exposes the internal modules for testing purposes.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod rendering;
pub mod state;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use state::AppState;

/// Build the service router with all routes and layers attached.
pub fn build_router(state: Arc<AppState>, prometheus_handle: PrometheusHandle) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);
    let prefix = state.config.url_prefix().to_string();

    let app = Router::new()
        // Overlay rendering
        .route("/api/composite", post(handlers::composite_handler))
        // UI data
        .route("/api/factors", get(handlers::factors_handler))
        .route("/api/legend", get(handlers::legend_handler))
        // Admin
        .route("/api/catalog/reload", post(handlers::catalog_reload_handler))
        .route("/api/cache/stats", get(handlers::cache_stats_handler))
        .route("/api/cache/clear", post(handlers::cache_clear_handler))
        // Health check
        .route("/health", get(handlers::health_handler))
        .route("/ready", get(handlers::ready_handler))
        // Metrics
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/metrics", get(handlers::api_metrics_handler));

    // axum does not nest at the root
    let app = if prefix == "/" {
        app.fallback_service(static_files)
    } else {
        app.nest_service(&prefix, static_files)
    };

    app.layer(Extension(state))
        .layer(Extension(prometheus_handle))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
