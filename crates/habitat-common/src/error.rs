//! Error types for the habitat overlay pipeline.

use thiserror::Error;

/// Result type alias using HabitatError.
pub type HabitatResult<T> = Result<T, HabitatError>;

/// Primary error type for catalog, raster and rendering operations.
#[derive(Debug, Error)]
pub enum HabitatError {
    // === Input Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Factor not found: {0}")]
    FactorNotFound(String),

    // === Data Errors ===
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Grid mismatch for layer '{layer}': {message}")]
    GridMismatch { layer: String, message: String },

    // === Output Errors ===
    #[error("Image encoding failed: {0}")]
    Encode(String),

    // === Infrastructure Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HabitatError {
    /// Shorthand for an invalid request parameter.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        HabitatError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Stable error code reported to API clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            HabitatError::InvalidParameter { .. } => "InvalidParameter",
            HabitatError::FactorNotFound(_) => "NotFoundError",
            HabitatError::Io(_) => "IOError",
            HabitatError::Format(_) | HabitatError::GridMismatch { .. } => "FormatError",
            HabitatError::Encode(_) => "EncodeError",
            HabitatError::Internal(_) => "InternalError",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            HabitatError::InvalidParameter { .. } => 400,
            HabitatError::FactorNotFound(_) => 404,
            _ => 500,
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for HabitatError {
    fn from(err: std::io::Error) -> Self {
        HabitatError::Io(err.to_string())
    }
}
