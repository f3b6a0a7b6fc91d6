//! Combine factor rasters into a single suitability grid.

use std::path::Path;
use std::sync::Arc;

use habitat_common::{HabitatResult, RasterGrid};
use storage::{CacheLookup, LayerCatalog, RasterCache};
use tracing::debug;

use super::types::FactorSelection;

/// Where factor rasters come from.
pub trait LayerSource: Send + Sync {
    fn load(&self, path: &Path) -> HabitatResult<Arc<RasterGrid>>;
}

/// GeoTIFF layers read from disk through the shared raster cache.
pub struct CachedGeoTiffSource {
    cache: Arc<RasterCache>,
}

impl CachedGeoTiffSource {
    pub fn new(cache: Arc<RasterCache>) -> Self {
        Self { cache }
    }
}

impl LayerSource for CachedGeoTiffSource {
    fn load(&self, path: &Path) -> HabitatResult<Arc<RasterGrid>> {
        let (grid, lookup) = self
            .cache
            .get_or_load(path, |p| Ok(geotiff_parser::read_geotiff(p)?))?;

        match lookup {
            CacheLookup::Hit => metrics::counter!("raster_cache_hits_total").increment(1),
            CacheLookup::Miss => metrics::counter!("raster_cache_misses_total").increment(1),
        }
        Ok(grid)
    }
}

/// Copy of the base raster with every value >= 0 set to 0.
///
/// The base only frames the result; its negative (no-data) cells survive and
/// mask those pixels out after clamping.
pub fn prepare_base(base: &RasterGrid) -> RasterGrid {
    let mut prepared = base.clone();
    for v in prepared.data_mut() {
        if *v >= 0.0 {
            *v = 0.0;
        }
    }
    prepared
}

/// Average of the selected factors (positives added, negatives subtracted)
/// on top of the prepared base, clamped to be non-negative.
///
/// `base` is used as given; callers pass it through [`prepare_base`] once.
/// Sums are kept in f64 and only the clamped average is narrowed to f32.
pub fn composite(
    base: &RasterGrid,
    selection: &FactorSelection,
    catalog: &LayerCatalog,
    source: &dyn LayerSource,
) -> HabitatResult<RasterGrid> {
    let mut acc: Vec<f64> = base.data().iter().map(|&v| f64::from(v)).collect();

    for name in &selection.positive {
        let layer = load_factor(name, base, catalog, source)?;
        for (sum, &v) in acc.iter_mut().zip(layer.data()) {
            *sum += f64::from(v);
        }
    }

    for name in &selection.negative {
        let layer = load_factor(name, base, catalog, source)?;
        for (sum, &v) in acc.iter_mut().zip(layer.data()) {
            *sum -= f64::from(v);
        }
    }

    let divisor = selection.factor_count().max(1) as f64;
    let mut result = base.clone();
    for (out, sum) in result.data_mut().iter_mut().zip(acc) {
        let averaged = sum / divisor;
        // NaN fails the comparison and is clamped too.
        *out = if averaged > 0.0 { averaged as f32 } else { 0.0 };
    }

    debug!(
        positive = selection.positive.len(),
        negative = selection.negative.len(),
        max = ?result.max_value(),
        "Composited factor layers"
    );

    Ok(result)
}

fn load_factor(
    name: &str,
    base: &RasterGrid,
    catalog: &LayerCatalog,
    source: &dyn LayerSource,
) -> HabitatResult<Arc<RasterGrid>> {
    let entry = catalog.lookup(name)?;
    let layer = source.load(&entry.layer_path)?;
    base.ensure_same_grid(&layer, &entry.layer_path.display().to_string())?;
    Ok(layer)
}
