//! Layer catalog: factor names mapped to raster files and descriptions.
//!
//! The catalog is a CSV table with `Name`, `Layer` and `Comment` columns.
//! `Layer` is a file name relative to the layers directory; `Comment` is a
//! markdown snippet shown in the description panel. Extra columns are
//! ignored.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use habitat_common::{HabitatError, HabitatResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A selectable habitat factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorEntry {
    /// Display name, unique within the catalog
    pub name: String,
    /// Raster file, already resolved against the layers directory
    pub layer_path: PathBuf,
    /// Markdown description
    pub comment: String,
}

/// One CSV row as written in the catalog file.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Layer")]
    layer: String,
    #[serde(rename = "Comment", default)]
    comment: Option<String>,
}

/// Immutable name -> factor lookup, preserving file order.
#[derive(Debug, Clone, Default)]
pub struct LayerCatalog {
    entries: Vec<FactorEntry>,
    index: HashMap<String, usize>,
}

impl LayerCatalog {
    /// Load the catalog from a CSV file, resolving layer files against
    /// `layers_dir`.
    pub fn load(path: impl AsRef<Path>, layers_dir: impl AsRef<Path>) -> HabitatResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| HabitatError::Io(format!("{}: {}", path.display(), e)))?;

        let catalog = Self::from_reader(file, layers_dir).map_err(|e| match e {
            HabitatError::Format(msg) => {
                HabitatError::Format(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        info!(
            path = %path.display(),
            factors = catalog.len(),
            "Loaded layer catalog"
        );

        Ok(catalog)
    }

    /// Parse catalog CSV from any reader.
    pub fn from_reader<R: Read>(reader: R, layers_dir: impl AsRef<Path>) -> HabitatResult<Self> {
        let layers_dir = layers_dir.as_ref();
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers().map_err(csv_error)?.clone();
        for required in ["Name", "Layer", "Comment"] {
            if !headers.iter().any(|h| h == required) {
                return Err(HabitatError::Format(format!(
                    "catalog is missing the '{}' column",
                    required
                )));
            }
        }

        let mut entries = Vec::new();
        for row in csv_reader.deserialize::<CatalogRow>() {
            let row = row.map_err(csv_error)?;
            if row.layer.is_empty() {
                return Err(HabitatError::Format(format!(
                    "factor '{}' has no layer file",
                    row.name
                )));
            }
            entries.push(FactorEntry {
                layer_path: layers_dir.join(&row.layer),
                comment: row.comment.unwrap_or_default(),
                name: row.name,
            });
        }

        Self::from_entries(entries)
    }

    /// Build a catalog from entries that are already resolved.
    pub fn from_entries(entries: Vec<FactorEntry>) -> HabitatResult<Self> {
        let mut index = HashMap::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            if entry.name.is_empty() {
                return Err(HabitatError::Format(format!(
                    "catalog row {} has an empty name",
                    i + 1
                )));
            }
            if entry.layer_path.as_os_str().is_empty() {
                return Err(HabitatError::Format(format!(
                    "factor '{}' has no layer file",
                    entry.name
                )));
            }
            if index.insert(entry.name.clone(), i).is_some() {
                return Err(HabitatError::Format(format!(
                    "duplicate factor name '{}'",
                    entry.name
                )));
            }
            debug!(name = %entry.name, layer = %entry.layer_path.display(), "Catalog entry");
        }

        Ok(Self { entries, index })
    }

    /// Look up a factor by display name.
    pub fn lookup(&self, name: &str) -> HabitatResult<&FactorEntry> {
        self.get(name)
            .ok_or_else(|| HabitatError::FactorNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&FactorEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entries in file order.
    pub fn entries(&self) -> &[FactorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn csv_error(err: csv::Error) -> HabitatError {
    if err.is_io_error() {
        HabitatError::Io(err.to_string())
    } else {
        HabitatError::Format(format!("malformed catalog: {}", err))
    }
}
