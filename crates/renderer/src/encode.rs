//! Encoding colorized rasters to image files.

use habitat_common::HabitatError;
use image::{ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest width or height libwebp accepts.
pub const WEBP_MAX_DIMENSION: u32 = 16383;

/// Errors raised while encoding an image.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("WebP encoding failed: {0}")]
    Webp(String),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),

    #[error("Image of {width}x{height} pixels cannot be encoded as {format}")]
    Dimensions {
        width: u32,
        height: u32,
        format: &'static str,
    },
}

impl From<RenderError> for HabitatError {
    fn from(err: RenderError) -> Self {
        HabitatError::Encode(err.to_string())
    }
}

/// Output file format of the suitability overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Webp,
    Png,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Webp => "webp",
            ImageFormat::Png => "png",
        }
    }
}

/// Encode as lossy WebP with alpha. `quality` ranges over 0..=100.
pub fn encode_webp(image: &RgbaImage, quality: f32) -> Result<Vec<u8>, RenderError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
        return Err(RenderError::Dimensions {
            width,
            height,
            format: "WebP",
        });
    }

    let encoder = webp::Encoder::from_rgba(image.as_raw(), width, height);
    let encoded = encoder
        .encode_simple(false, quality.clamp(0.0, 100.0))
        .map_err(|e| RenderError::Webp(format!("{:?}", e)))?;

    Ok(encoded.to_vec())
}

/// Encode as RGBA PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let (width, height) = image.dimensions();
    let mut output = Vec::new();

    image::codecs::png::PngEncoder::new(&mut output).write_image(
        image.as_raw(),
        width,
        height,
        image::ColorType::Rgba8,
    )?;

    Ok(output)
}

/// Encode in the requested format. `quality` only applies to WebP.
pub fn encode(
    image: &RgbaImage,
    format: ImageFormat,
    quality: f32,
) -> Result<Vec<u8>, RenderError> {
    match format {
        ImageFormat::Webp => encode_webp(image, quality),
        ImageFormat::Png => encode_png(image),
    }
}
