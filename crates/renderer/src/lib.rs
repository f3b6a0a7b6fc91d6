//! Image rendering for habitat suitability rasters.
//!
//! - Jet color ramp lookup table
//! - Normalize / threshold / colorize / crop
//! - WebP and PNG encoding

pub mod colorize;
pub mod encode;
pub mod gradient;

pub use colorize::{colorize, ColorizedRaster, PixelWindow};
pub use encode::{encode, encode_png, encode_webp, ImageFormat, RenderError};
pub use gradient::{Color, Colormap};
