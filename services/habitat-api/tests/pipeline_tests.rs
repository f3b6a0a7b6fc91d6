//! End-to-end pipeline tests against on-disk GeoTIFF layers.

use habitat_api::config::{AppConfig, OutputConfig};
use habitat_api::rendering::CompositeRequest;
use habitat_api::state::AppState;
use habitat_common::HabitatError;
use renderer::ImageFormat;
use test_utils::fixtures::{bbox, factors};
use test_utils::{
    assert_bounds_approx_eq, create_constant_grid, create_rectangle_grid, raster, LayerFixture,
};

const SIZE: usize = 10;

fn config_for(fixture: &LayerFixture) -> AppConfig {
    AppConfig {
        layers_dir: fixture.layers_dir(),
        catalog_path: fixture.catalog_path(),
        base_raster: fixture.base_path(),
        static_dir: fixture.static_dir(),
        output: OutputConfig {
            format: ImageFormat::Png,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn state_for(fixture: &LayerFixture) -> AppState {
    AppState::new(config_for(fixture)).expect("state should load")
}

fn request(positive: &[&str], negative: &[&str]) -> CompositeRequest {
    CompositeRequest {
        positive_factors: positive.iter().map(|s| s.to_string()).collect(),
        negative_factors: negative.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

/// Roads: value 4 in rows 2..=4, cols 3..=5. Wetlands: constant 1.
fn fixture() -> LayerFixture {
    let mut fixture = LayerFixture::new(SIZE, SIZE, bbox::default_view());
    fixture.add_factor(
        factors::ROADS,
        factors::ROADS_COMMENT,
        create_rectangle_grid(SIZE, SIZE, (2, 4), (3, 5), 4.0),
    );
    fixture.add_factor(
        factors::WETLANDS,
        factors::WETLANDS_COMMENT,
        create_constant_grid(SIZE, SIZE, 1.0),
    );
    fixture
}

fn output_files(fixture: &LayerFixture) -> usize {
    std::fs::read_dir(fixture.static_dir()).unwrap().count()
}

#[test]
fn test_no_selection_returns_default_view() {
    let fixture = fixture();
    let state = state_for(&fixture);
    let catalog = tokio_test::block_on(state.catalog());

    let result = state.pipeline.run(&request(&[], &[]), &catalog).unwrap();

    assert_eq!(result.image_url, "");
    assert_eq!(result.bounds, [[56.0, 24.0], [58.0, 26.0]]);
    assert_eq!(result.opacity, 0.5);
    assert_eq!(result.description, "No factors selected.");
    assert_eq!(output_files(&fixture), 0);
}

#[test]
fn test_shipped_labels_keep_english_no_selection() {
    let fixture = fixture();
    let shipped = AppConfig::from_yaml(include_str!("../../../config/habitat.yaml")).unwrap();
    let state = AppState::new(AppConfig {
        labels: shipped.labels,
        ..config_for(&fixture)
    })
    .unwrap();
    let catalog = tokio_test::block_on(state.catalog());

    let result = state.pipeline.run(&CompositeRequest::default(), &catalog).unwrap();
    assert_eq!(result.description, "No factors selected.");

    let result = state.pipeline.run(&request(&[factors::ROADS], &[]), &catalog).unwrap();
    assert!(result
        .description
        .starts_with("**Pozitīvie faktori ar koeficienta vērtību +1:**"));
    assert!(result.description.ends_with("- Nav izvēlēts neviens"));
}

#[test]
fn test_rectangle_is_cropped() {
    let fixture = fixture();
    let state = state_for(&fixture);
    let catalog = tokio_test::block_on(state.catalog());

    let result = state.pipeline.run(&request(&[factors::ROADS], &[]), &catalog).unwrap();

    // 0.2 degree pixels over 24..26 / 56..58
    assert_bounds_approx_eq!(result.bounds, [[57.0, 24.6], [57.6, 25.2]], 1e-9);
    assert!(result.image_url.starts_with("/static/output_raster.png?t="));

    let image = image::open(fixture.static_dir().join("output_raster.png"))
        .unwrap()
        .to_rgba8();
    assert_eq!(image.dimensions(), (3, 3));
    assert!(image.pixels().all(|p| p.0 == [127, 0, 0, 255]));
}

#[test]
fn test_all_zero_composite_keeps_full_extent() {
    let fixture = fixture();
    let state = state_for(&fixture);
    let catalog = tokio_test::block_on(state.catalog());

    // Wetlands minus itself is zero everywhere
    let result = state
        .pipeline
        .run(&request(&[factors::WETLANDS], &[factors::WETLANDS]), &catalog)
        .unwrap();

    assert_bounds_approx_eq!(result.bounds, [[56.0, 24.0], [58.0, 26.0]], 1e-9);
    let image = image::open(fixture.static_dir().join("output_raster.png"))
        .unwrap()
        .to_rgba8();
    assert_eq!(image.dimensions(), (SIZE as u32, SIZE as u32));
    assert!(image.pixels().all(|p| p.0[3] == 0));
}

#[test]
fn test_negative_factor_masks_pixels() {
    let fixture = fixture();
    let state = state_for(&fixture);
    let catalog = tokio_test::block_on(state.catalog());

    // (4 - 1) / 2 inside the rectangle, clamped to 0 elsewhere
    let selection = request(&[factors::ROADS], &[factors::WETLANDS]).selection();
    let raster = state.pipeline.render(&selection, 0, &catalog).unwrap();

    assert_eq!(raster.image.dimensions(), (3, 3));
    assert_bounds_approx_eq!(raster.bounds.to_leaflet(), [[57.0, 24.6], [57.6, 25.2]], 1e-9);
}

#[test]
fn test_description_lists_selected_factors() {
    let fixture = fixture();
    let state = state_for(&fixture);
    let catalog = tokio_test::block_on(state.catalog());

    let result = state
        .pipeline
        .run(&request(&[factors::ROADS, factors::WETLANDS], &[]), &catalog)
        .unwrap();

    let (positive, negative) = result
        .description
        .split_once("**Negative factors with coefficient -1:**")
        .unwrap();
    assert!(positive.contains(factors::ROADS));
    assert!(positive.contains(factors::ROADS_COMMENT));
    assert!(positive.contains(factors::WETLANDS));
    assert!(positive.contains(factors::WETLANDS_COMMENT));
    assert!(negative.ends_with("- None selected"));
}

#[test]
fn test_repeated_requests_are_identical() {
    let fixture = fixture();
    let state = state_for(&fixture);
    let catalog = tokio_test::block_on(state.catalog());
    let req = request(&[factors::ROADS, factors::WETLANDS], &[]);
    let path = fixture.static_dir().join("output_raster.png");

    let first = state.pipeline.run(&req, &catalog).unwrap();
    let first_bytes = std::fs::read(&path).unwrap();
    let second = state.pipeline.run(&req, &catalog).unwrap();
    let second_bytes = std::fs::read(&path).unwrap();

    assert_eq!(first.bounds, second.bounds);
    assert_eq!(first.description, second.description);
    assert_eq!(first_bytes, second_bytes);

    let strip = |url: &str| url.split("?t=").next().unwrap().to_string();
    assert_eq!(strip(&first.image_url), strip(&second.image_url));
}

#[test]
fn test_unknown_factor_writes_nothing() {
    let fixture = fixture();
    let state = state_for(&fixture);
    let catalog = tokio_test::block_on(state.catalog());

    let err = state
        .pipeline
        .run(&request(&[factors::UNKNOWN], &[]), &catalog)
        .unwrap_err();

    assert!(matches!(err, HabitatError::FactorNotFound(_)));
    assert_eq!(output_files(&fixture), 0);
    assert!(state.raster_cache.is_empty());
}

#[test]
fn test_mismatched_layer_shape() {
    let mut fixture = fixture();
    fixture.add_factor_grid(
        factors::FOREST_EDGE,
        factors::FOREST_EDGE_COMMENT,
        &raster(vec![1.0; 6], 3, 2),
    );
    let state = state_for(&fixture);
    let catalog = tokio_test::block_on(state.catalog());

    let err = state
        .pipeline
        .run(&request(&[factors::FOREST_EDGE], &[]), &catalog)
        .unwrap_err();

    assert!(matches!(err, HabitatError::GridMismatch { .. }));
}

#[test]
fn test_missing_layer_file_is_io_error() {
    let mut fixture = fixture();
    fixture.add_missing_factor(factors::FOREST_EDGE, factors::FOREST_EDGE_COMMENT);
    let state = state_for(&fixture);
    let catalog = tokio_test::block_on(state.catalog());

    let err = state
        .pipeline
        .run(&request(&[factors::FOREST_EDGE], &[]), &catalog)
        .unwrap_err();

    assert!(matches!(err, HabitatError::Io(_)));
    assert!(state.raster_cache.is_empty());
}

#[test]
fn test_invalid_threshold_rejected_before_rendering() {
    let fixture = fixture();
    let state = state_for(&fixture);
    let catalog = tokio_test::block_on(state.catalog());

    let req = CompositeRequest {
        threshold_percent: 150,
        ..request(&[factors::ROADS], &[])
    };
    let err = state.pipeline.run(&req, &catalog).unwrap_err();

    assert!(matches!(err, HabitatError::InvalidParameter { .. }));
    assert_eq!(output_files(&fixture), 0);
}

#[test]
fn test_layers_are_cached() {
    let fixture = fixture();
    let state = state_for(&fixture);
    let catalog = tokio_test::block_on(state.catalog());
    let req = request(&[factors::ROADS], &[]);

    state.pipeline.run(&req, &catalog).unwrap();
    state.pipeline.run(&req, &catalog).unwrap();

    assert_eq!(state.raster_cache.len(), 1);
    let stats = state.raster_cache.stats();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.total_values_cached, (SIZE * SIZE) as u64);
}

#[test]
fn test_base_no_data_masks_output() {
    let mut base = vec![1.0f32; SIZE * SIZE];
    // Knock out the centre pixel of the rectangle
    base[3 * SIZE + 4] = -9999.0;
    let mut fixture = LayerFixture::with_base(base, SIZE, SIZE, bbox::default_view());
    fixture.add_factor(
        factors::ROADS,
        factors::ROADS_COMMENT,
        create_rectangle_grid(SIZE, SIZE, (2, 4), (3, 5), 4.0),
    );
    let state = state_for(&fixture);
    let catalog = tokio_test::block_on(state.catalog());

    let selection = request(&[factors::ROADS], &[]).selection();
    let raster = state.pipeline.render(&selection, 0, &catalog).unwrap();

    assert_eq!(raster.image.dimensions(), (3, 3));
    assert_eq!(raster.image.get_pixel(1, 1).0[3], 0);
    assert_eq!(raster.image.get_pixel(0, 0).0[3], 255);
}

#[test]
fn test_catalog_reload_picks_up_new_factor() {
    let mut fixture = fixture();
    let state = state_for(&fixture);
    assert_eq!(tokio_test::block_on(state.catalog()).len(), 2);

    fixture.add_factor(
        factors::FOREST_EDGE,
        factors::FOREST_EDGE_COMMENT,
        create_constant_grid(SIZE, SIZE, 2.0),
    );
    let count = tokio_test::block_on(state.reload_catalog()).unwrap();

    assert_eq!(count, 3);
    assert!(tokio_test::block_on(state.catalog()).contains(factors::FOREST_EDGE));
}

#[test]
fn test_startup_fails_without_catalog() {
    let fixture = fixture();
    let config = AppConfig {
        catalog_path: fixture.layers_dir().join("missing.csv"),
        ..config_for(&fixture)
    };

    assert!(AppState::new(config).is_err());
}
