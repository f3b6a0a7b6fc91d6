//! Tests for reading GeoTIFF rasters from disk.

use std::fs::File;
use std::io::BufWriter;

use geotiff_parser::{
    read_geotiff, write_geotiff, GeoTiffError, MODEL_PIXEL_SCALE_TAG, MODEL_TIEPOINT_TAG,
};
use habitat_common::{BoundingBox, HabitatError, RasterGrid};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

fn cesis_bbox() -> BoundingBox {
    BoundingBox::new(24.77478809, 56.91368127, 26.189455608, 57.507346438)
}

// ============================================================================
// Successful reads
// ============================================================================

#[test]
fn test_write_then_read_float_raster() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("factor.tif");

    let data: Vec<f32> = (0..20).map(|i| i as f32 * 0.5 - 3.0).collect();
    let grid = RasterGrid::new(data.clone(), 5, 4, cesis_bbox()).unwrap();
    write_geotiff(&path, &grid).unwrap();

    let read = read_geotiff(&path).unwrap();
    assert_eq!(read.width(), 5);
    assert_eq!(read.height(), 4);
    assert_eq!(read.data(), &data[..]);
    assert!(read.bbox().approx_eq(&cesis_bbox(), 1e-9));
}

#[test]
fn test_read_raster_larger_than_default_decoder_limit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("large.tif");

    // 8300 x 8300 f32 is about 263 MiB of samples
    let (width, height) = (8300, 8300);
    let mut data = vec![0.0f32; width * height];
    data[0] = -1.0;
    data[width * height - 1] = 7.5;
    let grid = RasterGrid::new(data, width, height, cesis_bbox()).unwrap();
    write_geotiff(&path, &grid).unwrap();
    drop(grid);

    let read = read_geotiff(&path).unwrap();
    assert_eq!((read.width(), read.height()), (width, height));
    assert_eq!(read.data()[0], -1.0);
    assert_eq!(read.data()[width * height - 1], 7.5);
}

#[test]
fn test_read_integer_raster_converts_to_f32() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("classes.tif");

    {
        let file = BufWriter::new(File::create(&path).unwrap());
        let mut encoder = TiffEncoder::new(file).unwrap();
        let mut image = encoder.new_image::<colortype::Gray16>(2, 2).unwrap();
        image
            .encoder()
            .write_tag(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE_TAG), &[0.5f64, 0.25, 0.0][..])
            .unwrap();
        image
            .encoder()
            .write_tag(
                Tag::from_u16_exhaustive(MODEL_TIEPOINT_TAG),
                &[0.0f64, 0.0, 0.0, 24.0, 58.0, 0.0][..],
            )
            .unwrap();
        image.write_data(&[1u16, 2, 300, 65535]).unwrap();
    }

    let grid = read_geotiff(&path).unwrap();
    assert_eq!(grid.data(), &[1.0, 2.0, 300.0, 65535.0]);
    let bbox = grid.bbox();
    assert!((bbox.west() - 24.0).abs() < 1e-12);
    assert!((bbox.north() - 58.0).abs() < 1e-12);
    assert!((bbox.east() - 25.0).abs() < 1e-12);
    assert!((bbox.south() - 57.5).abs() < 1e-12);
}

#[test]
fn test_tiepoint_offset_from_origin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("offset.tif");

    {
        let file = BufWriter::new(File::create(&path).unwrap());
        let mut encoder = TiffEncoder::new(file).unwrap();
        let mut image = encoder.new_image::<colortype::Gray32Float>(4, 2).unwrap();
        image
            .encoder()
            .write_tag(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE_TAG), &[1.0f64, 1.0, 0.0][..])
            .unwrap();
        // Tie point anchored at pixel (2, 1) instead of the corner.
        image
            .encoder()
            .write_tag(
                Tag::from_u16_exhaustive(MODEL_TIEPOINT_TAG),
                &[2.0f64, 1.0, 0.0, 12.0, 49.0, 0.0][..],
            )
            .unwrap();
        image.write_data(&[0.0f32; 8]).unwrap();
    }

    let grid = read_geotiff(&path).unwrap();
    assert_eq!(*grid.bbox(), BoundingBox::new(10.0, 48.0, 14.0, 50.0));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_geotiff(dir.path().join("missing.tif")).unwrap_err();
    assert!(matches!(err, GeoTiffError::IoError(_)));
    assert!(matches!(HabitatError::from(err), HabitatError::Io(_)));
}

#[test]
fn test_multiband_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rgb.tif");

    {
        let file = BufWriter::new(File::create(&path).unwrap());
        let mut encoder = TiffEncoder::new(file).unwrap();
        encoder
            .write_image::<colortype::RGB8>(2, 1, &[255, 0, 0, 0, 255, 0])
            .unwrap();
    }

    let err = read_geotiff(&path).unwrap_err();
    assert!(matches!(err, GeoTiffError::MultiBand(_)));
    assert!(matches!(HabitatError::from(err), HabitatError::Format(_)));
}

#[test]
fn test_not_a_tiff_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layer.tif");
    std::fs::write(&path, b"Name,Layer,Comment\n").unwrap();

    let err = read_geotiff(&path).unwrap_err();
    assert!(matches!(HabitatError::from(err), HabitatError::Format(_)));
}
