//! GeoTIFF reader for single-band factor and base rasters.
//!
//! Only the subset of GeoTIFF needed for habitat factor layers is supported:
//! one band, any integer or floating point sample type, north-up grids
//! georeferenced by `ModelPixelScaleTag` + `ModelTiepointTag` or by an
//! axis-aligned `ModelTransformationTag`. No reprojection is performed; the
//! tie point coordinates are taken to be longitude/latitude degrees.
//!
//! # Example
//! ```ignore
//! let grid = geotiff_parser::read_geotiff("Layers/10301.tif")?;
//! println!("{}x{} {:?}", grid.width(), grid.height(), grid.bbox());
//! ```

mod error;

pub use error::{GeoTiffError, GeoTiffResult};

use habitat_common::{BoundingBox, RasterGrid};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tiff::ColorType;
use tracing::debug;

/// GeoTIFF tag numbers (GeoTIFF 1.0, section 2.6).
pub const MODEL_PIXEL_SCALE_TAG: u16 = 33550;
pub const MODEL_TIEPOINT_TAG: u16 = 33922;
pub const MODEL_TRANSFORMATION_TAG: u16 = 34264;
pub const GEO_KEY_DIRECTORY_TAG: u16 = 34735;

/// GTRasterTypeGeoKey and its PixelIsPoint value.
const GT_RASTER_TYPE_GEO_KEY: u32 = 1025;
const RASTER_PIXEL_IS_POINT: u32 = 2;

/// Read a single-band GeoTIFF file into a [`RasterGrid`].
pub fn read_geotiff<P: AsRef<Path>>(path: P) -> GeoTiffResult<RasterGrid> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        GeoTiffError::IoError(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;

    let grid = decode_geotiff(BufReader::new(file)).map_err(|e| match e {
        GeoTiffError::Tiff(err) => {
            GeoTiffError::InvalidFormat(format!("{}: {}", path.display(), err))
        }
        other => other,
    })?;

    debug!(
        path = %path.display(),
        width = grid.width(),
        height = grid.height(),
        "Read GeoTIFF raster"
    );

    Ok(grid)
}

/// Decode a single-band GeoTIFF from any seekable reader.
pub fn decode_geotiff<R: Read + Seek>(reader: R) -> GeoTiffResult<RasterGrid> {
    // Factor layers are full-country rasters; the default 256 MiB cap is too small
    let mut decoder = Decoder::new(reader)?.with_limits(Limits::unlimited());

    match decoder.colortype()? {
        ColorType::Gray(_) => {}
        other => return Err(GeoTiffError::MultiBand(format!("{:?}", other))),
    }

    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);

    let bbox = read_bounds(&mut decoder, width, height)?;
    let data = samples_to_f32(decoder.read_image()?);

    RasterGrid::new(data, width, height, bbox)
        .map_err(|e| GeoTiffError::InvalidFormat(e.to_string()))
}

/// Write a grid as a single-band 32-bit float GeoTIFF.
pub fn write_geotiff<P: AsRef<Path>>(path: P, grid: &RasterGrid) -> GeoTiffResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    encode_geotiff(&mut writer, grid)?;
    writer.flush()?;
    Ok(())
}

/// Encode a grid as a single-band 32-bit float GeoTIFF.
pub fn encode_geotiff<W: Write + Seek>(writer: W, grid: &RasterGrid) -> GeoTiffResult<()> {
    let bbox = grid.bbox();
    let pixel_scale = [grid.pixel_width(), grid.pixel_height(), 0.0];
    let tiepoint = [0.0, 0.0, 0.0, bbox.west(), bbox.north(), 0.0];

    let mut encoder = TiffEncoder::new(writer)?;
    let mut image =
        encoder.new_image::<colortype::Gray32Float>(grid.width() as u32, grid.height() as u32)?;
    image
        .encoder()
        .write_tag(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE_TAG), &pixel_scale[..])?;
    image
        .encoder()
        .write_tag(Tag::from_u16_exhaustive(MODEL_TIEPOINT_TAG), &tiepoint[..])?;
    image.write_data(grid.data())?;

    Ok(())
}

/// Derive the geographic bounds of the raster from its GeoTIFF tags.
fn read_bounds<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    width: usize,
    height: usize,
) -> GeoTiffResult<BoundingBox> {
    let pixel_scale = find_f64_tag(decoder, MODEL_PIXEL_SCALE_TAG)?;
    let tiepoint = find_f64_tag(decoder, MODEL_TIEPOINT_TAG)?;
    let transform = find_f64_tag(decoder, MODEL_TRANSFORMATION_TAG)?;

    let (mut west, mut north, sx, sy) = match (pixel_scale, tiepoint, transform) {
        (Some(scale), Some(tie), _) => {
            if scale.len() < 2 || tie.len() < 6 {
                return Err(GeoTiffError::InvalidFormat(format!(
                    "pixel scale has {} values and tie point {}",
                    scale.len(),
                    tie.len()
                )));
            }
            let (sx, sy) = (scale[0], scale[1]);
            let west = tie[3] - tie[0] * sx;
            let north = tie[4] + tie[1] * sy;
            (west, north, sx, sy)
        }
        (_, _, Some(m)) => {
            if m.len() < 8 {
                return Err(GeoTiffError::InvalidFormat(format!(
                    "model transformation has {} values, expected 16",
                    m.len()
                )));
            }
            if m[1] != 0.0 || m[4] != 0.0 {
                return Err(GeoTiffError::InvalidFormat(
                    "rotated model transformations are not supported".to_string(),
                ));
            }
            (m[3], m[7], m[0], -m[5])
        }
        _ => {
            return Err(GeoTiffError::MissingGeoreference(
                "neither ModelPixelScale/ModelTiepoint nor ModelTransformation present".to_string(),
            ))
        }
    };

    if !(sx > 0.0 && sy > 0.0) {
        return Err(GeoTiffError::InvalidFormat(format!(
            "only north-up rasters with positive pixel size are supported (sx={}, sy={})",
            sx, sy
        )));
    }

    // PixelIsPoint tie points reference pixel centres.
    if raster_type(decoder)? == Some(RASTER_PIXEL_IS_POINT) {
        west -= sx / 2.0;
        north += sy / 2.0;
    }

    Ok(BoundingBox::new(
        west,
        north - height as f64 * sy,
        west + width as f64 * sx,
        north,
    ))
}

fn find_f64_tag<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    tag: u16,
) -> GeoTiffResult<Option<Vec<f64>>> {
    let value = decoder.find_tag(Tag::from_u16_exhaustive(tag))?;
    Ok(value.map(|v| v.into_f64_vec()).transpose()?)
}

/// Value of GTRasterTypeGeoKey from the GeoKey directory, if present.
fn raster_type<R: Read + Seek>(decoder: &mut Decoder<R>) -> GeoTiffResult<Option<u32>> {
    let directory = match decoder.find_tag(Tag::from_u16_exhaustive(GEO_KEY_DIRECTORY_TAG))? {
        Some(value) => value.into_u32_vec()?,
        None => return Ok(None),
    };

    // Header is 4 shorts, then one 4-short entry per key:
    // [key id, tag location, count, value or offset].
    Ok(directory
        .get(4..)
        .unwrap_or_default()
        .chunks_exact(4)
        .find(|entry| entry[0] == GT_RASTER_TYPE_GEO_KEY && entry[1] == 0)
        .map(|entry| entry[3]))
}

fn samples_to_f32(result: DecodingResult) -> Vec<f32> {
    match result {
        DecodingResult::U8(values) => values.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U16(values) => values.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U32(values) => values.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U64(values) => values.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(values) => values.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I16(values) => values.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I32(values) => values.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I64(values) => values.into_iter().map(|v| v as f32).collect(),
        DecodingResult::F32(values) => values,
        DecodingResult::F64(values) => values.into_iter().map(|v| v as f32).collect(),
    }
}
