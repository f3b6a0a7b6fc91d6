//! Single-band raster grids with geographic framing.

use crate::{BoundingBox, HabitatError, HabitatResult};

/// Fraction of a pixel two grids' edges may differ by and still count as
/// co-registered.
const BOUNDS_TOLERANCE_PIXELS: f64 = 1e-6;

/// A single-band raster on a regular lat/lon grid.
///
/// Values are stored row-major with row 0 at the north edge and column 0 at
/// the west edge.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    data: Vec<f32>,
    /// Number of columns
    width: usize,
    /// Number of rows
    height: usize,
    bbox: BoundingBox,
}

impl RasterGrid {
    /// Create a grid, checking that the buffer matches the dimensions and the
    /// bounds are usable.
    pub fn new(
        data: Vec<f32>,
        width: usize,
        height: usize,
        bbox: BoundingBox,
    ) -> HabitatResult<Self> {
        if width == 0 || height == 0 {
            return Err(HabitatError::Format(format!(
                "raster has empty dimensions {}x{}",
                width, height
            )));
        }
        if data.len() != width * height {
            return Err(HabitatError::Format(format!(
                "raster buffer holds {} values, expected {}x{} = {}",
                data.len(),
                width,
                height,
                width * height
            )));
        }
        if !bbox.is_valid() {
            return Err(HabitatError::Format(format!("invalid raster bounds {:?}", bbox)));
        }

        Ok(Self {
            data,
            width,
            height,
            bbox,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Largest finite value, or None when the grid has no finite values.
    pub fn max_value(&self) -> Option<f32> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                Some(m) if m >= v => Some(m),
                _ => Some(v),
            })
    }

    /// Longitude span of one column.
    pub fn pixel_width(&self) -> f64 {
        self.bbox.width() / self.width as f64
    }

    /// Latitude span of one row.
    pub fn pixel_height(&self) -> f64 {
        self.bbox.height() / self.height as f64
    }

    /// Fail unless `other` has the same shape and bounds as `self`.
    ///
    /// `layer` names the offending input in the error.
    pub fn ensure_same_grid(&self, other: &RasterGrid, layer: &str) -> HabitatResult<()> {
        if self.shape() != other.shape() {
            return Err(HabitatError::GridMismatch {
                layer: layer.to_string(),
                message: format!(
                    "shape {}x{} (rows x cols) does not match base {}x{}",
                    other.height, other.width, self.height, self.width
                ),
            });
        }

        let pixel = self.pixel_width().abs().min(self.pixel_height().abs());
        let tolerance = pixel * BOUNDS_TOLERANCE_PIXELS;
        if !self.bbox.approx_eq(&other.bbox, tolerance) {
            return Err(HabitatError::GridMismatch {
                layer: layer.to_string(),
                message: format!(
                    "bounds {:?} do not match base {:?}",
                    other.bbox, self.bbox
                ),
            });
        }

        Ok(())
    }
}
