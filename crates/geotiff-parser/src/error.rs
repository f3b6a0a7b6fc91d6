//! Error types for GeoTIFF parsing operations.

use habitat_common::HabitatError;
use thiserror::Error;

/// Result type for GeoTIFF parser operations.
pub type GeoTiffResult<T> = Result<T, GeoTiffError>;

/// Error types for GeoTIFF parsing.
#[derive(Error, Debug)]
pub enum GeoTiffError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The TIFF structure could not be decoded
    #[error("TIFF decoding error: {0}")]
    Tiff(tiff::TiffError),

    /// More than one sample per pixel
    #[error("Expected a single-band raster, found colour type {0}")]
    MultiBand(String),

    /// Missing GeoTIFF georeferencing tags
    #[error("Missing georeferencing: {0}")]
    MissingGeoreference(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl From<tiff::TiffError> for GeoTiffError {
    fn from(err: tiff::TiffError) -> Self {
        match err {
            tiff::TiffError::IoError(io) => GeoTiffError::IoError(io),
            other => GeoTiffError::Tiff(other),
        }
    }
}

impl From<GeoTiffError> for HabitatError {
    fn from(err: GeoTiffError) -> Self {
        match err {
            GeoTiffError::IoError(io) => HabitatError::Io(io.to_string()),
            other => HabitatError::Format(other.to_string()),
        }
    }
}
