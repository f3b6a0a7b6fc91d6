//! On-disk layer directories for integration tests.
//!
//! A [`LayerFixture`] owns a temporary directory laid out like a deployment:
//!
//! ```text
//! <tmp>/Layers/base.tif
//! <tmp>/Layers/<factor>.tif
//! <tmp>/Layers/layers.csv
//! <tmp>/static/
//! ```

use std::path::{Path, PathBuf};

use habitat_common::{BoundingBox, RasterGrid};
use tempfile::TempDir;

/// Temporary layers directory with a base raster, factor rasters and a
/// catalog CSV.
pub struct LayerFixture {
    dir: TempDir,
    width: usize,
    height: usize,
    bbox: BoundingBox,
    rows: Vec<(String, String, String)>,
}

impl LayerFixture {
    /// Create the directory and write a base raster of ones.
    pub fn new(width: usize, height: usize, bbox: BoundingBox) -> Self {
        Self::with_base(vec![1.0; width * height], width, height, bbox)
    }

    /// Create the directory with an explicit base raster.
    pub fn with_base(base: Vec<f32>, width: usize, height: usize, bbox: BoundingBox) -> Self {
        let dir = tempfile::Builder::new()
            .prefix("habitat_layers")
            .tempdir()
            .expect("Failed to create temporary test directory");
        std::fs::create_dir_all(dir.path().join("Layers")).expect("Failed to create Layers dir");
        std::fs::create_dir_all(dir.path().join("static")).expect("Failed to create static dir");

        let fixture = Self {
            dir,
            width,
            height,
            bbox,
            rows: Vec::new(),
        };
        fixture.write_raster("base.tif", base);
        fixture.write_catalog();
        fixture
    }

    /// Add a factor raster with the base's shape and bounds and rewrite the
    /// catalog. Returns the raster path.
    pub fn add_factor(&mut self, name: &str, comment: &str, data: Vec<f32>) -> PathBuf {
        let file_name = format!("{}.tif", slug(name));
        let path = self.write_raster(&file_name, data);
        self.add_catalog_row(name, &file_name, comment);
        path
    }

    /// Add a factor backed by an arbitrary grid (e.g. with the wrong shape).
    pub fn add_factor_grid(&mut self, name: &str, comment: &str, grid: &RasterGrid) -> PathBuf {
        let file_name = format!("{}.tif", slug(name));
        let path = self.layers_dir().join(&file_name);
        geotiff_parser::write_geotiff(&path, grid).expect("Failed to write factor GeoTIFF");
        self.add_catalog_row(name, &file_name, comment);
        path
    }

    /// Add a catalog row whose layer file does not exist.
    pub fn add_missing_factor(&mut self, name: &str, comment: &str) {
        let file_name = format!("{}.tif", slug(name));
        self.add_catalog_row(name, &file_name, comment);
    }

    fn add_catalog_row(&mut self, name: &str, file_name: &str, comment: &str) {
        self.rows
            .push((name.to_string(), file_name.to_string(), comment.to_string()));
        self.write_catalog();
    }

    fn write_raster(&self, file_name: &str, data: Vec<f32>) -> PathBuf {
        let path = self.layers_dir().join(file_name);
        let grid = RasterGrid::new(data, self.width, self.height, self.bbox)
            .expect("Invalid fixture raster");
        geotiff_parser::write_geotiff(&path, &grid).expect("Failed to write GeoTIFF");
        path
    }

    fn write_catalog(&self) {
        let mut writer =
            csv::Writer::from_path(self.catalog_path()).expect("Failed to create catalog CSV");
        writer
            .write_record(["Name", "Layer", "Comment"])
            .expect("Failed to write catalog header");
        for (name, layer, comment) in &self.rows {
            writer
                .write_record([name, layer, comment])
                .expect("Failed to write catalog row");
        }
        writer.flush().expect("Failed to flush catalog CSV");
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn layers_dir(&self) -> PathBuf {
        self.dir.path().join("Layers")
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.layers_dir().join("layers.csv")
    }

    pub fn base_path(&self) -> PathBuf {
        self.layers_dir().join("base.tif")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.dir.path().join("static")
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }
}

/// File-system friendly version of a factor name.
fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}
