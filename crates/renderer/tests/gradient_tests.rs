//! Tests for the jet color ramp.

use renderer::gradient::{Color, Colormap, LUT_SIZE};

// ============================================================================
// Raster colors
// ============================================================================

#[test]
fn test_jet_bottom_is_dark_blue() {
    let cmap = Colormap::jet();
    assert_eq!(cmap.map(0.0), Color::new(0, 0, 127, 255));
}

#[test]
fn test_jet_top_is_dark_red() {
    let cmap = Colormap::jet();
    assert_eq!(cmap.map(1.0), Color::new(127, 0, 0, 255));
}

#[test]
fn test_jet_low_values_are_blue() {
    let cmap = Colormap::jet();
    assert_eq!(cmap.map(0.2), Color::new(0, 76, 255, 255));
}

#[test]
fn test_jet_out_of_range_saturates() {
    let cmap = Colormap::jet();
    assert_eq!(cmap.map(1.5), cmap.map(1.0));
    assert_eq!(cmap.map(-0.3), cmap.map(0.0));
}

#[test]
fn test_values_in_same_bucket_share_color() {
    let cmap = Colormap::jet();
    let bucket = 1.0 / LUT_SIZE as f32;
    assert_eq!(cmap.map(10.0 * bucket + bucket * 0.25), cmap.map(10.0 * bucket + bucket * 0.75));
}

#[test]
fn test_raster_colors_are_opaque() {
    let cmap = Colormap::jet();
    for i in 0..=20 {
        assert_eq!(cmap.map(i as f32 / 20.0).a, 255);
    }
}

// ============================================================================
// Legend swatches
// ============================================================================

#[test]
fn test_sample_hex_ten_colors() {
    let colors = Colormap::jet().sample_hex(10);
    assert_eq!(colors.len(), 10);
    assert_eq!(colors[0], "#000080");
    assert_eq!(colors[1], "#0000ff");
    assert_eq!(colors[4], "#4dffaa");
    assert_eq!(colors[9], "#800000");
}

#[test]
fn test_sample_hex_format() {
    for hex in Colormap::jet().sample_hex(32) {
        assert_eq!(hex.len(), 7);
        assert!(hex.starts_with('#'));
        assert!(hex[1..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}

#[test]
fn test_sample_hex_degenerate_counts() {
    let cmap = Colormap::jet();
    assert!(cmap.sample_hex(0).is_empty());
    assert_eq!(cmap.sample_hex(1), vec!["#000080".to_string()]);
}

#[test]
fn test_color_to_hex() {
    assert_eq!(Color::new(255, 16, 0, 0).to_hex(), "#ff1000");
}
