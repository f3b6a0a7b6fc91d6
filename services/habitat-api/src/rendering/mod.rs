//! Habitat suitability overlay pipeline.
//!
//! composite -> colorize/crop -> describe -> emit. The whole pipeline is
//! synchronous; handlers run it on the blocking pool.

pub mod composite;
pub mod description;
pub mod emitter;
pub mod types;

use std::sync::Arc;
use std::time::Instant;

use habitat_common::{HabitatResult, LeafletBounds, RasterGrid};
use renderer::{ColorizedRaster, Colormap};
use storage::LayerCatalog;
use tracing::info;

pub use composite::{composite, prepare_base, CachedGeoTiffSource, LayerSource};
pub use description::{describe, DescriptionLabels};
pub use emitter::{EmittedImage, ImageEmitter};
pub use types::{CompositeRequest, CompositeResult, FactorSelection};

/// Everything needed to turn a factor selection into an overlay.
pub struct CompositePipeline {
    /// Base raster with non-negative values already zeroed
    base: Arc<RasterGrid>,
    source: Arc<dyn LayerSource>,
    colormap: Colormap,
    emitter: ImageEmitter,
    default_bounds: LeafletBounds,
    labels: DescriptionLabels,
}

impl CompositePipeline {
    pub fn new(
        base: &RasterGrid,
        source: Arc<dyn LayerSource>,
        emitter: ImageEmitter,
        default_bounds: LeafletBounds,
        labels: DescriptionLabels,
    ) -> Self {
        Self {
            base: Arc::new(prepare_base(base)),
            source,
            colormap: Colormap::jet(),
            emitter,
            default_bounds,
            labels,
        }
    }

    pub fn colormap(&self) -> &Colormap {
        &self.colormap
    }

    pub fn emitter(&self) -> &ImageEmitter {
        &self.emitter
    }

    /// Handle one UI request end to end.
    ///
    /// With no factors selected nothing is read or written and the default
    /// view is returned.
    pub fn run(
        &self,
        request: &CompositeRequest,
        catalog: &LayerCatalog,
    ) -> HabitatResult<CompositeResult> {
        let threshold = request.validate()?;
        let selection = request.selection();

        if selection.is_empty() {
            return Ok(CompositeResult {
                image_url: String::new(),
                bounds: self.default_bounds,
                opacity: request.transparency,
                description: self.labels.no_selection.clone(),
            });
        }

        let start = Instant::now();
        let raster = self.render(&selection, threshold, catalog)?;
        let description =
            describe(&selection.positive, &selection.negative, catalog, &self.labels)?;
        let emitted = self.emitter.emit(&raster.image)?;

        info!(
            positive = selection.positive.len(),
            negative = selection.negative.len(),
            threshold,
            width = raster.image.width(),
            height = raster.image.height(),
            size_bytes = emitted.size_bytes,
            duration_ms = start.elapsed().as_millis() as u64,
            "Rendered composite overlay"
        );

        Ok(CompositeResult {
            image_url: emitted.url,
            bounds: raster.bounds.to_leaflet(),
            opacity: request.transparency,
            description,
        })
    }

    /// Composite and colorize without writing anything.
    pub fn render(
        &self,
        selection: &FactorSelection,
        threshold_percent: u8,
        catalog: &LayerCatalog,
    ) -> HabitatResult<ColorizedRaster> {
        let grid = composite(&self.base, selection, catalog, self.source.as_ref())?;
        Ok(renderer::colorize(&grid, threshold_percent, &self.colormap))
    }
}
