//! Tests for loading the layer catalog from disk.

use habitat_common::HabitatError;
use storage::LayerCatalog;
use test_utils::fixtures::{bbox, catalog, factors};
use test_utils::LayerFixture;

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_keeps_file_order() {
    let mut fixture = LayerFixture::new(2, 2, bbox::default_view());
    fixture.add_factor(factors::WETLANDS, factors::WETLANDS_COMMENT, vec![0.0; 4]);
    fixture.add_factor(factors::ROADS, factors::ROADS_COMMENT, vec![0.0; 4]);

    let catalog = LayerCatalog::load(fixture.catalog_path(), fixture.layers_dir()).unwrap();
    let names: Vec<&str> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec![factors::WETLANDS, factors::ROADS]);
}

#[test]
fn test_layer_paths_point_at_rasters() {
    let mut fixture = LayerFixture::new(2, 2, bbox::default_view());
    let written =
        fixture.add_factor(factors::FOREST_EDGE, factors::FOREST_EDGE_COMMENT, vec![1.0; 4]);

    let catalog = LayerCatalog::load(fixture.catalog_path(), fixture.layers_dir()).unwrap();
    let entry = catalog.lookup(factors::FOREST_EDGE).unwrap();
    assert_eq!(entry.layer_path, written);
    assert_eq!(entry.comment, factors::FOREST_EDGE_COMMENT);
}

#[test]
fn test_missing_raster_does_not_fail_load() {
    let mut fixture = LayerFixture::new(2, 2, bbox::default_view());
    fixture.add_missing_factor(factors::WETLANDS, "");

    let catalog = LayerCatalog::load(fixture.catalog_path(), fixture.layers_dir()).unwrap();
    assert!(catalog.contains(factors::WETLANDS));
    assert_eq!(catalog.lookup(factors::WETLANDS).unwrap().comment, "");
}

#[test]
fn test_empty_catalog() {
    let fixture = LayerFixture::new(2, 2, bbox::default_view());
    let catalog = LayerCatalog::load(fixture.catalog_path(), fixture.layers_dir()).unwrap();
    assert!(catalog.is_empty());
}

#[test]
fn test_extra_columns_ignored() {
    let csv = "Name,Layer,Comment,Source\nRoads,roads.tif,near roads,OSM\n";
    let catalog = LayerCatalog::from_reader(csv.as_bytes(), "Layers").unwrap();
    assert_eq!(catalog.lookup("Roads").unwrap().comment, "near roads");
}

#[test]
fn test_whitespace_is_trimmed() {
    let csv = "Name , Layer , Comment\n Roads , roads.tif , near roads \n";
    let catalog = LayerCatalog::from_reader(csv.as_bytes(), "Layers").unwrap();
    assert_eq!(catalog.lookup("Roads").unwrap().comment, "near roads");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = LayerCatalog::load(dir.path().join("layers.csv"), dir.path()).unwrap_err();
    assert!(matches!(err, HabitatError::Io(_)));
    assert_eq!(err.error_code(), "IOError");
}

#[test]
fn test_missing_column_is_format_error() {
    let err = LayerCatalog::from_reader(catalog::MISSING_COMMENT_COLUMN.as_bytes(), "Layers")
        .unwrap_err();
    assert!(matches!(err, HabitatError::Format(ref msg) if msg.contains("Comment")));
}

#[test]
fn test_duplicate_names_are_format_error() {
    let err = LayerCatalog::from_reader(catalog::DUPLICATE_NAMES.as_bytes(), "Layers").unwrap_err();
    assert!(matches!(err, HabitatError::Format(ref msg) if msg.contains("duplicate")));
}

#[test]
fn test_empty_name_is_format_error() {
    let csv = "Name,Layer,Comment\n,roads.tif,x\n";
    let err = LayerCatalog::from_reader(csv.as_bytes(), "Layers").unwrap_err();
    assert!(matches!(err, HabitatError::Format(_)));
}

#[test]
fn test_empty_layer_is_format_error() {
    let csv = "Name,Layer,Comment\nRoads,,x\n";
    let err = LayerCatalog::from_reader(csv.as_bytes(), "Layers").unwrap_err();
    assert!(matches!(err, HabitatError::Format(_)));
}

#[test]
fn test_load_error_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layers.csv");
    std::fs::write(&path, catalog::DUPLICATE_NAMES).unwrap();

    let err = LayerCatalog::load(&path, dir.path()).unwrap_err();
    assert!(err.to_string().contains("layers.csv"));
}

#[test]
fn test_unknown_factor_is_not_found() {
    let catalog = LayerCatalog::from_reader(catalog::TWO_FACTORS.as_bytes(), "Layers").unwrap();
    let err = catalog.lookup(factors::UNKNOWN).unwrap_err();
    assert_eq!(err.error_code(), "NotFoundError");
    assert_eq!(err.http_status_code(), 404);
}
