//! Writes the rendered overlay into the static directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use habitat_common::{HabitatError, HabitatResult};
use image::RgbaImage;
use renderer::ImageFormat;
use tracing::{debug, warn};

use crate::config::{OutputConfig, OutputNaming};

/// Freshness token format appended to image URLs.
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%3f";

/// An image written to disk.
#[derive(Debug, Clone)]
pub struct EmittedImage {
    /// URL relative to the server root, including the freshness token
    pub url: String,
    pub path: PathBuf,
    pub size_bytes: usize,
}

/// Encodes overlays and publishes them under a URL prefix.
#[derive(Debug, Clone)]
pub struct ImageEmitter {
    dir: PathBuf,
    url_prefix: String,
    file_stem: String,
    format: ImageFormat,
    quality: f32,
    naming: OutputNaming,
    retain: usize,
}

impl ImageEmitter {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: &str, output: &OutputConfig) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            file_stem: output.file_stem.clone(),
            format: output.format,
            quality: output.quality,
            naming: output.naming,
            retain: output.retain.max(1),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Encode `image` and atomically replace the output file.
    pub fn emit(&self, image: &RgbaImage) -> HabitatResult<EmittedImage> {
        let bytes = renderer::encode(image, self.format, self.quality)?;

        let file_name = self.next_file_name();
        let path = self.dir.join(&file_name);
        write_atomic(&self.dir, &path, &bytes)?;

        if self.naming == OutputNaming::PerRequest {
            self.prune(&path);
        }

        let token = chrono::Local::now().format(TIMESTAMP_FORMAT);
        let url = format!("{}/{}?t={}", self.url_prefix, file_name, token);

        debug!(path = %path.display(), size = bytes.len(), url = %url, "Wrote overlay image");

        Ok(EmittedImage {
            url,
            path,
            size_bytes: bytes.len(),
        })
    }

    fn next_file_name(&self) -> String {
        let ext = self.format.extension();
        match self.naming {
            OutputNaming::Fixed => format!("{}.{}", self.file_stem, ext),
            OutputNaming::PerRequest => {
                format!("{}_{}.{}", self.file_stem, uuid::Uuid::new_v4().simple(), ext)
            }
        }
    }

    /// Delete older per-request images beyond `retain`. Failures are logged,
    /// never returned: the new image is already in place.
    fn prune(&self, keep: &Path) {
        let prefix = format!("{}_", self.file_stem);
        let ext = self.format.extension();

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, dir = %self.dir.display(), "Failed to list output directory");
                return;
            }
        };

        let mut outputs: Vec<(SystemTime, PathBuf)> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path != keep)
            .filter(|path| {
                path.extension().and_then(|e| e.to_str()) == Some(ext)
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(&prefix))
            })
            .filter_map(|path| {
                let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
                Some((modified, path))
            })
            .collect();

        // Newest first; the file just written counts toward `retain`.
        outputs.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, path) in outputs.into_iter().skip(self.retain - 1) {
            if let Err(e) = fs::remove_file(&path) {
                warn!(error = %e, path = %path.display(), "Failed to prune old overlay");
            }
        }
    }
}

/// Write through a temporary file in the same directory and rename it over
/// `path`, so readers never see a partially written image.
fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> HabitatResult<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".overlay")
        .tempfile_in(dir)
        .map_err(|e| HabitatError::Io(format!("{}: {}", dir.display(), e)))?;

    tmp.write_all(bytes)
        .and_then(|_| tmp.flush())
        .map_err(|e| HabitatError::Io(format!("{}: {}", tmp.path().display(), e)))?;

    tmp.persist(path)
        .map_err(|e| HabitatError::Io(format!("{}: {}", path.display(), e.error)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn image() -> RgbaImage {
        RgbaImage::from_pixel(3, 2, Rgba([255, 0, 0, 255]))
    }

    fn output(naming: OutputNaming, retain: usize) -> OutputConfig {
        OutputConfig {
            naming,
            retain,
            ..Default::default()
        }
    }

    #[test]
    fn test_fixed_name_and_token() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = ImageEmitter::new(dir.path(), "/static/", &output(OutputNaming::Fixed, 1));

        let emitted = emitter.emit(&image()).unwrap();
        assert!(emitted.url.starts_with("/static/output_raster.webp?t="));
        let token = emitted.url.rsplit("?t=").next().unwrap();
        assert_eq!(token.len(), 17);
        assert!(token.chars().all(|c| c.is_ascii_digit()));
        assert!(dir.path().join("output_raster.webp").exists());
    }

    #[test]
    fn test_fixed_name_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = ImageEmitter::new(dir.path(), "/static", &output(OutputNaming::Fixed, 1));

        emitter.emit(&image()).unwrap();
        emitter.emit(&image()).unwrap();

        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().flatten().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_per_request_prunes_old_files() {
        let dir = tempfile::tempdir().unwrap();
        let emitter =
            ImageEmitter::new(dir.path(), "/static", &output(OutputNaming::PerRequest, 2));

        let mut last = None;
        for _ in 0..4 {
            last = Some(emitter.emit(&image()).unwrap());
        }

        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().flatten().collect();
        assert_eq!(files.len(), 2);
        assert!(last.unwrap().path.exists());
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = output(OutputNaming::Fixed, 1);
        let emitter = ImageEmitter::new(dir.path().join("nope"), "/static", &config);

        let err = emitter.emit(&image()).unwrap_err();
        assert!(matches!(err, HabitatError::Io(_)));
    }
}
