//! GeoTIFF reading and writing through GDAL (feature `gdal`)
//!
//! Full-fidelity backend: preserves CRS, nodata and sample type exactly.
//! Signatures match the native backend so callers never notice the swap.

use crate::crs::Crs;
use crate::error::Result;
use crate::raster::{GeoTransform, Raster, RasterElement};
use gdal::raster::{Buffer, GdalType, RasterCreationOptions};
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use std::path::Path;

/// Options for writing GeoTIFF files
#[derive(Debug, Clone)]
pub struct GeoTiffOptions {
    /// Compression type: "DEFLATE", "LZW", "ZSTD", "NONE"
    pub compression: String,
    /// Tile size for tiled TIFFs (0 for strips)
    pub tile_size: usize,
}

impl Default for GeoTiffOptions {
    fn default() -> Self {
        Self {
            compression: "DEFLATE".to_string(),
            tile_size: 256,
        }
    }
}

/// Read one band of a GeoTIFF file into a Raster
///
/// `band` is 1-indexed and defaults to the first band.
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement + GdalType,
    P: AsRef<Path>,
{
    let dataset = Dataset::open(path.as_ref())?;
    let rasterband = dataset.rasterband(band.unwrap_or(1))?;

    let (cols, rows) = dataset.raster_size();
    let buffer = rasterband.read_as::<T>((0, 0), (cols, rows), (cols, rows), None)?;

    let mut raster = Raster::from_vec(buffer.data().to_vec(), rows, cols)?;

    if let Ok(gt) = dataset.geo_transform() {
        raster.set_transform(GeoTransform::from_gdal(gt));
    }

    if let Ok(srs) = dataset.spatial_ref() {
        let crs = match srs.auth_code() {
            Ok(code) => Some(Crs::Epsg(code as u32)),
            Err(_) => srs.to_wkt().ok().map(Crs::Wkt),
        };
        raster.set_crs(crs);
    }

    if let Some(nodata) = rasterband.no_data_value() {
        if let Some(nd) = num_traits::cast(nodata) {
            raster.set_nodata(Some(nd));
        }
    }

    Ok(raster)
}

/// Write a Raster to a single-band GeoTIFF file
pub fn write_geotiff<T, P>(
    raster: &Raster<T>,
    path: P,
    options: Option<GeoTiffOptions>,
) -> Result<()>
where
    T: RasterElement + GdalType,
    P: AsRef<Path>,
{
    let opts = options.unwrap_or_default();
    let driver = DriverManager::get_driver_by_name("GTiff")?;

    let (rows, cols) = raster.shape();

    let mut create_options = vec![format!("COMPRESS={}", opts.compression)];
    if opts.tile_size > 0 {
        create_options.push("TILED=YES".to_string());
        create_options.push(format!("BLOCKXSIZE={}", opts.tile_size));
        create_options.push(format!("BLOCKYSIZE={}", opts.tile_size));
    }
    let creation_options =
        RasterCreationOptions::from_iter(create_options.iter().map(|s| s.as_str()));

    let mut dataset = driver.create_with_band_type_with_options::<T, _>(
        path.as_ref(),
        cols,
        rows,
        1,
        &creation_options,
    )?;

    dataset.set_geo_transform(&raster.transform().to_gdal())?;

    if let Some(crs) = raster.crs() {
        let srs = match crs {
            Crs::Epsg(code) => SpatialRef::from_epsg(*code)?,
            Crs::Wkt(wkt) => SpatialRef::from_wkt(wkt)?,
            Crs::Proj(def) => SpatialRef::from_proj4(def)?,
        };
        dataset.set_spatial_ref(&srs)?;
    }

    let mut band = dataset.rasterband(1)?;

    if let Some(nodata) = raster.nodata().and_then(|nd| nd.to_f64()) {
        band.set_no_data_value(Some(nodata))?;
    }

    let data: Vec<T> = raster.data().iter().copied().collect();
    let mut buffer = Buffer::new((cols, rows), data);
    band.write((0, 0), (cols, rows), &mut buffer)?;

    Ok(())
}
