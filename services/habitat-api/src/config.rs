//! Service configuration.
//!
//! Loaded from a YAML file (default `config/habitat.yaml`). Every field has a
//! default, so a missing file or a partial file is fine.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use habitat_common::{BoundingBox, LeafletBounds};
use renderer::ImageFormat;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::rendering::DescriptionLabels;

/// Legend swatch count limits.
pub const MIN_LEGEND_COLORS: usize = 2;
pub const MAX_LEGEND_COLORS: usize = 256;

/// How overlay files are named in the static directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputNaming {
    /// One file, overwritten by every request
    #[default]
    Fixed,
    /// A new file per request, older ones pruned
    PerRequest,
}

/// Overlay image output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub file_stem: String,
    pub format: ImageFormat,
    /// WebP quality, 0-100
    pub quality: f32,
    pub naming: OutputNaming,
    /// Per-request files to keep
    pub retain: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_stem: "output_raster".to_string(),
            format: ImageFormat::Webp,
            quality: 75.0,
            naming: OutputNaming::Fixed,
            retain: 16,
        }
    }
}

/// Map view returned when nothing is selected, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsConfig {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            west: 24.0,
            south: 56.0,
            east: 26.0,
            north: 58.0,
        }
    }
}

impl BoundsConfig {
    pub fn to_bbox(&self) -> BoundingBox {
        BoundingBox::new(self.west, self.south, self.east, self.north)
    }

    pub fn to_leaflet(&self) -> LeafletBounds {
        self.to_bbox().to_leaflet()
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub listen: String,
    /// Directory the catalog's `Layer` column is relative to
    pub layers_dir: PathBuf,
    pub catalog_path: PathBuf,
    pub base_raster: PathBuf,
    /// Where overlay images are written and served from
    pub static_dir: PathBuf,
    pub static_url_prefix: String,
    pub output: OutputConfig,
    pub default_bounds: BoundsConfig,
    pub labels: DescriptionLabels,
    pub legend_colors: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8050".to_string(),
            layers_dir: PathBuf::from("Layers"),
            catalog_path: PathBuf::from("Layers/HH_layers.csv"),
            base_raster: PathBuf::from("Layers/10301.tif"),
            static_dir: PathBuf::from("static"),
            static_url_prefix: "/static".to_string(),
            output: OutputConfig::default(),
            default_bounds: BoundsConfig::default(),
            labels: DescriptionLabels::default(),
            legend_colors: 10,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate YAML configuration.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.output.quality) {
            bail!("output.quality must be between 0 and 100, got {}", self.output.quality);
        }
        if self.output.file_stem.is_empty()
            || self.output.file_stem.contains(['/', '\\'])
        {
            bail!("output.file_stem must be a plain file name, got '{}'", self.output.file_stem);
        }
        if !self.default_bounds.to_bbox().is_valid() {
            bail!("default_bounds are not a valid box: {:?}", self.default_bounds);
        }
        if !(MIN_LEGEND_COLORS..=MAX_LEGEND_COLORS).contains(&self.legend_colors) {
            bail!(
                "legend_colors must be between {} and {}, got {}",
                MIN_LEGEND_COLORS,
                MAX_LEGEND_COLORS,
                self.legend_colors
            );
        }
        if !self.static_url_prefix.starts_with('/') {
            bail!("static_url_prefix must start with '/', got '{}'", self.static_url_prefix);
        }
        Ok(())
    }

    /// URL prefix without a trailing slash, as used for routing.
    pub fn url_prefix(&self) -> &str {
        let trimmed = self.static_url_prefix.trim_end_matches('/');
        if trimmed.is_empty() {
            "/"
        } else {
            trimmed
        }
    }
}
