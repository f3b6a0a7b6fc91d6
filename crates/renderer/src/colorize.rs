//! Normalize, threshold, colorize and crop a composite suitability grid.

use habitat_common::{BoundingBox, RasterGrid};
use image::RgbaImage;
use rayon::prelude::*;
use tracing::debug;

use crate::gradient::{Color, Colormap};

/// Inclusive pixel window of the significant part of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub min_row: usize,
    pub max_row: usize,
    pub min_col: usize,
    pub max_col: usize,
}

impl PixelWindow {
    /// Number of columns in the window.
    pub fn width(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    /// Number of rows in the window.
    pub fn height(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    /// Geographic extent of the window's outer pixel edges inside a raster of
    /// `cols` x `rows` pixels covering `full`.
    pub fn geo_bounds(&self, full: &BoundingBox, rows: usize, cols: usize) -> BoundingBox {
        let pixel_width = full.width() / cols as f64;
        let pixel_height = full.height() / rows as f64;

        BoundingBox::new(
            full.west() + self.min_col as f64 * pixel_width,
            full.north() - (self.max_row + 1) as f64 * pixel_height,
            full.west() + (self.max_col + 1) as f64 * pixel_width,
            full.north() - self.min_row as f64 * pixel_height,
        )
    }
}

/// A colorized raster ready for encoding.
#[derive(Debug, Clone)]
pub struct ColorizedRaster {
    pub image: RgbaImage,
    /// Geographic extent of `image`.
    pub bounds: BoundingBox,
    /// Crop window inside the source grid, None when nothing was significant
    /// and the full raster was kept.
    pub window: Option<PixelWindow>,
}

/// Divide every value by the grid's largest finite value.
///
/// Non-finite values become 0. A grid whose maximum is not positive
/// normalizes to all zeros.
pub fn normalize(grid: &RasterGrid) -> Vec<f32> {
    match grid.max_value() {
        Some(max) if max > 0.0 => grid
            .data()
            .par_iter()
            .map(|&v| if v.is_finite() { v / max } else { 0.0 })
            .collect(),
        _ => vec![0.0; grid.data().len()],
    }
}

/// Zero every value strictly below `threshold_percent / 100`.
pub fn apply_threshold(values: &mut [f32], threshold_percent: u8) {
    let threshold = threshold_percent as f32 / 100.0;
    values.par_iter_mut().for_each(|v| {
        if *v < threshold {
            *v = 0.0;
        }
    });
}

/// Smallest window containing every value > 0, or None when there is none.
pub fn significant_window(values: &[f32], width: usize) -> Option<PixelWindow> {
    if width == 0 {
        return None;
    }

    values
        .par_chunks(width)
        .enumerate()
        .filter_map(|(row, cells)| {
            let first = cells.iter().position(|&v| v > 0.0)?;
            let last = cells.iter().rposition(|&v| v > 0.0)?;
            Some(PixelWindow {
                min_row: row,
                max_row: row,
                min_col: first,
                max_col: last,
            })
        })
        .reduce_with(|a, b| PixelWindow {
            min_row: a.min_row.min(b.min_row),
            max_row: a.max_row.max(b.max_row),
            min_col: a.min_col.min(b.min_col),
            max_col: a.max_col.max(b.max_col),
        })
}

/// Map normalized values to RGBA pixels. Values > 0 are opaque, everything
/// else is fully transparent.
pub fn render_rgba(values: &[f32], width: usize, height: usize, colormap: &Colormap) -> RgbaImage {
    let mut image = RgbaImage::new(width as u32, height as u32);
    if width == 0 || height == 0 {
        return image;
    }

    let buffer: &mut [u8] = &mut image;
    buffer
        .par_chunks_mut(width * 4)
        .zip(values.par_chunks(width))
        .for_each(|(pixels, row)| {
            for (pixel, &value) in pixels.chunks_exact_mut(4).zip(row) {
                let color = if value > 0.0 {
                    colormap.map(value)
                } else {
                    colormap.map(value).with_alpha(0)
                };
                write_pixel(pixel, color);
            }
        });

    image
}

fn write_pixel(pixel: &mut [u8], color: Color) {
    pixel[0] = color.r;
    pixel[1] = color.g;
    pixel[2] = color.b;
    pixel[3] = color.a;
}

/// Full colorize step: normalize, threshold, color and crop.
pub fn colorize(grid: &RasterGrid, threshold_percent: u8, colormap: &Colormap) -> ColorizedRaster {
    let mut values = normalize(grid);
    apply_threshold(&mut values, threshold_percent);
    colorize_normalized(&values, grid.width(), grid.height(), grid.bbox(), colormap)
}

/// Color and crop already normalized and thresholded values.
pub fn colorize_normalized(
    values: &[f32],
    width: usize,
    height: usize,
    bbox: &BoundingBox,
    colormap: &Colormap,
) -> ColorizedRaster {
    let image = render_rgba(values, width, height, colormap);

    match significant_window(values, width) {
        Some(window) => {
            let cropped = image::imageops::crop_imm(
                &image,
                window.min_col as u32,
                window.min_row as u32,
                window.width() as u32,
                window.height() as u32,
            )
            .to_image();
            debug!(?window, width, height, "Cropped raster to significant window");

            ColorizedRaster {
                image: cropped,
                bounds: window.geo_bounds(bbox, height, width),
                window: Some(window),
            }
        }
        None => {
            debug!(width, height, "No significant pixels, keeping full raster");
            ColorizedRaster {
                image,
                bounds: *bbox,
                window: None,
            }
        }
    }
}
