//! Application state and shared resources.

use anyhow::{Context, Result};
use std::fs;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use habitat_common::{HabitatError, HabitatResult};
use storage::{LayerCatalog, RasterCache};

use crate::config::AppConfig;
use crate::metrics::PipelineMetrics;
use crate::rendering::{CachedGeoTiffSource, CompositePipeline, ImageEmitter};

/// Shared application state.
pub struct AppState {
    pub config: AppConfig,
    /// Swapped wholesale on reload; requests keep the snapshot they started with
    pub catalog: RwLock<Arc<LayerCatalog>>,
    pub raster_cache: Arc<RasterCache>,
    pub pipeline: CompositePipeline,
    pub metrics: Arc<PipelineMetrics>,
}

impl AppState {
    /// Load the catalog and base raster and prepare the output directory.
    ///
    /// Any failure here aborts startup.
    pub fn new(config: AppConfig) -> Result<Self> {
        let catalog = LayerCatalog::load(&config.catalog_path, &config.layers_dir)
            .with_context(|| {
                format!("Failed to load layer catalog {}", config.catalog_path.display())
            })?;

        let base = geotiff_parser::read_geotiff(&config.base_raster)
            .with_context(|| {
                format!("Failed to read base raster {}", config.base_raster.display())
            })?;

        fs::create_dir_all(&config.static_dir)
            .with_context(|| {
                format!("Failed to create static directory {}", config.static_dir.display())
            })?;

        info!(
            factors = catalog.len(),
            width = base.width(),
            height = base.height(),
            base = %config.base_raster.display(),
            "Loaded layer catalog and base raster"
        );

        let raster_cache = Arc::new(RasterCache::new());
        let source = Arc::new(CachedGeoTiffSource::new(raster_cache.clone()));
        let emitter = ImageEmitter::new(&config.static_dir, config.url_prefix(), &config.output);
        let pipeline = CompositePipeline::new(
            &base,
            source,
            emitter,
            config.default_bounds.to_leaflet(),
            config.labels.clone(),
        );

        let metrics = Arc::new(PipelineMetrics::new());
        metrics.record_catalog_reload(catalog.len());

        Ok(Self {
            config,
            catalog: RwLock::new(Arc::new(catalog)),
            raster_cache,
            pipeline,
            metrics,
        })
    }

    /// Current catalog snapshot.
    pub async fn catalog(&self) -> Arc<LayerCatalog> {
        self.catalog.read().await.clone()
    }

    /// Re-read the catalog file. The old catalog stays in place on failure.
    pub async fn reload_catalog(&self) -> HabitatResult<usize> {
        let path = self.config.catalog_path.clone();
        let layers_dir = self.config.layers_dir.clone();
        let catalog = tokio::task::spawn_blocking(move || LayerCatalog::load(path, layers_dir))
            .await
            .map_err(|e| HabitatError::Internal(e.to_string()))??;

        let count = catalog.len();
        *self.catalog.write().await = Arc::new(catalog);
        self.metrics.record_catalog_reload(count);
        info!(factors = count, "Reloaded layer catalog");
        Ok(count)
    }
}
