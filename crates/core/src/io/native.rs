//! Native GeoTIFF reading/writing (without GDAL dependency)
//!
//! Built on the `tiff` crate. Handles single-band grids with the
//! ModelPixelScale/ModelTiepoint georeferencing tags plus the de-facto
//! `GDAL_NODATA` tag, which is all the pipeline persists. For multi-band
//! containers or exotic sample formats, enable the `gdal` feature.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
const TAG_MODEL_TIEPOINT: u16 = 33922;
const TAG_GEO_KEY_DIRECTORY: u16 = 34735;
const TAG_GDAL_NODATA: u16 = 42113;

/// Options for writing GeoTIFF files
#[derive(Debug, Clone)]
pub struct GeoTiffOptions {
    /// Compression (not supported by the native writer)
    pub compression: String,
}

impl Default for GeoTiffOptions {
    fn default() -> Self {
        Self {
            compression: "NONE".to_string(),
        }
    }
}

/// Read a GeoTIFF file into a Raster.
///
/// The `band` argument exists for signature parity with the GDAL backend;
/// the native reader always decodes the file's single image.
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_geotiff(file, band)
}

/// Read a GeoTIFF from an in-memory buffer into a Raster
pub fn read_geotiff_from_buffer<T>(data: &[u8], band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
{
    decode_geotiff(Cursor::new(data), band)
}

fn decode_geotiff<T, R>(reader: R, _band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    R: std::io::Read + std::io::Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    macro_rules! cast_buffer {
        ($buf:expr) => {
            $buf.iter()
                .map(|&v| num_traits::cast(v).unwrap_or(T::default_nodata()))
                .collect()
        };
    }

    let data: Vec<T> = match result {
        DecodingResult::U8(buf) => cast_buffer!(buf),
        DecodingResult::U16(buf) => cast_buffer!(buf),
        DecodingResult::U32(buf) => cast_buffer!(buf),
        DecodingResult::I8(buf) => cast_buffer!(buf),
        DecodingResult::I16(buf) => cast_buffer!(buf),
        DecodingResult::I32(buf) => cast_buffer!(buf),
        DecodingResult::F32(buf) => cast_buffer!(buf),
        DecodingResult::F64(buf) => cast_buffer!(buf),
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;

    match read_geotransform(&mut decoder) {
        Ok(transform) => raster.set_transform(transform),
        Err(e) => eprintln!("DBG read_geotransform failed: {:?}", e),
    }

    if let Ok(text) = decoder.get_tag_ascii_string(Tag::Unknown(TAG_GDAL_NODATA)) {
        if let Ok(value) = text.trim().trim_end_matches('\0').parse::<f64>() {
            raster.set_nodata(num_traits::cast(value));
        }
    }

    Ok(raster)
}

/// Recover a GeoTransform from the ModelPixelScale + ModelTiepoint tags
fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Result<GeoTransform> {
    eprintln!("DBG scale raw: {:?}", decoder.get_tag(Tag::Unknown(TAG_MODEL_PIXEL_SCALE)));
    eprintln!("DBG f64vec: {:?}", decoder.get_tag_f64_vec(Tag::Unknown(TAG_MODEL_PIXEL_SCALE)));
    let scale = decoder
        .get_tag_f64_vec(Tag::Unknown(TAG_MODEL_PIXEL_SCALE))
        .map_err(|_| Error::Other("No pixel scale tag".into()))?;

    let tiepoint = decoder
        .get_tag_f64_vec(Tag::Unknown(TAG_MODEL_TIEPOINT))
        .map_err(|_| Error::Other("No tiepoint tag".into()))?;

    if scale.len() >= 2 && tiepoint.len() >= 6 {
        // tiepoint: [I, J, K, X, Y, Z]; scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];

        return Ok(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]));
    }

    Err(Error::Other("Cannot determine geotransform".into()))
}

/// Write a Raster to a GeoTIFF file.
///
/// The native writer stores samples as 32-bit float regardless of `T`.
pub fn write_geotiff<T, P>(
    raster: &Raster<T>,
    path: P,
    _options: Option<GeoTiffOptions>,
) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    encode_geotiff(raster, file)
}

/// Write a Raster to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer<T>(
    raster: &Raster<T>,
    _options: Option<GeoTiffOptions>,
) -> Result<Vec<u8>>
where
    T: RasterElement,
{
    let mut buf = Vec::new();
    encode_geotiff(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W) -> Result<()>
where
    T: RasterElement,
    W: std::io::Write + std::io::Seek,
{
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();

    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    let gt = raster.transform();

    let scale = vec![gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(TAG_MODEL_PIXEL_SCALE), scale.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

    let tiepoint = vec![0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(TAG_MODEL_TIEPOINT), tiepoint.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

    // Minimal GeoKeyDirectory so downstream tools accept the file:
    // GTModelTypeGeoKey=Projected, GTRasterTypeGeoKey=PixelIsArea.
    let geokeys: Vec<u16> = vec![
        1, 1, 0, 2, //
        1024, 0, 1, 1, //
        1025, 0, 1, 1, //
    ];
    image
        .encoder()
        .write_tag(Tag::Unknown(TAG_GEO_KEY_DIRECTORY), geokeys.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;

    if let Some(nodata) = raster.nodata().and_then(|nd| nd.to_f64()) {
        let text = format!("{}", nodata);
        image
            .encoder()
            .write_tag(Tag::Unknown(TAG_GDAL_NODATA), text.as_str())
            .map_err(|e| Error::Other(format!("Cannot write nodata tag: {}", e)))?;
    }

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}
