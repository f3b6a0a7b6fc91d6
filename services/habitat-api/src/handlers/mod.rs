//! HTTP request handlers.
//!
//! This module is organized into submodules:
//! - `composite`: overlay rendering
//! - `api`: factor list and legend
//! - `cache`: raster cache admin and catalog reload
//! - `metrics`: health checks, Prometheus metrics, and monitoring
//! - `common`: JSON error responses

pub mod api;
pub mod cache;
pub mod common;
pub mod composite;
pub mod metrics;

pub use common::{ApiError, ErrorBody};

pub use composite::composite_handler;

pub use api::{factors_handler, legend_handler, FactorInfo, FactorsResponse, LegendResponse};

pub use cache::{
    cache_clear_handler, cache_stats_handler, catalog_reload_handler, CacheStatsResponse,
};

pub use metrics::{api_metrics_handler, health_handler, metrics_handler, ready_handler};
