//! Test data generators for creating synthetic suitability rasters.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use habitat_common::{BoundingBox, RasterGrid};

use crate::fixtures::bbox;

/// Creates a grid filled with a single value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a grid that is `value` inside the inclusive row/column rectangle
/// and 0 elsewhere.
///
/// ```
/// use test_utils::create_rectangle_grid;
///
/// let grid = create_rectangle_grid(4, 3, (1, 2), (2, 3), 5.0);
/// assert_eq!(grid[4 + 2], 5.0); // row 1, col 2
/// assert_eq!(grid[0], 0.0);
/// ```
pub fn create_rectangle_grid(
    width: usize,
    height: usize,
    rows: (usize, usize),
    cols: (usize, usize),
    value: f32,
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for row in rows.0..=rows.1.min(height.saturating_sub(1)) {
        for col in cols.0..=cols.1.min(width.saturating_sub(1)) {
            data[row * width + col] = value;
        }
    }
    data
}

/// Creates a west-to-east ramp from 0 at the first column to `max` at the
/// last.
pub fn create_gradient_grid(width: usize, height: usize, max: f32) -> Vec<f32> {
    let span = (width.max(2) - 1) as f32;
    let mut data = Vec::with_capacity(width * height);
    for _ in 0..height {
        for col in 0..width {
            data.push(col as f32 / span * max);
        }
    }
    data
}

/// Creates a grid with NaN values at specified positions.
///
/// * `nan_positions` - List of (col, row) positions that should be NaN
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}

/// Wrap `data` in a [`RasterGrid`] over the default map view.
///
/// Panics when the buffer does not match the dimensions.
pub fn raster(data: Vec<f32>, width: usize, height: usize) -> RasterGrid {
    raster_with_bbox(data, width, height, bbox::default_view())
}

/// Wrap `data` in a [`RasterGrid`] over `bbox`.
pub fn raster_with_bbox(
    data: Vec<f32>,
    width: usize,
    height: usize,
    bbox: BoundingBox,
) -> RasterGrid {
    RasterGrid::new(data, width, height, bbox).expect("Invalid test raster")
}
