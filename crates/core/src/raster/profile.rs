//! Typed raster profile
//!
//! A `RasterProfile` is the explicit, validated counterpart to the loose
//! key-value profile dictionaries common in scripting GIS stacks: every
//! field a georeferenced grid needs, and nothing else.

use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use serde::{Deserialize, Serialize};

/// Pixel data type of a persisted band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    UInt8,
    UInt16,
    UInt32,
    Int8,
    Int16,
    Int32,
    Float32,
    Float64,
}

impl DataType {
    /// Canonical lowercase name, matching common GIS tooling
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::UInt8 => "uint8",
            DataType::UInt16 => "uint16",
            DataType::UInt32 => "uint32",
            DataType::Int8 => "int8",
            DataType::Int16 => "int16",
            DataType::Int32 => "int32",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
        }
    }
}

/// Immutable metadata describing a georeferenced pixel grid.
///
/// Validated at construction: zero-sized grids and zero band counts are
/// rejected, so a profile in hand always describes a usable raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterProfile {
    width: usize,
    height: usize,
    count: usize,
    dtype: DataType,
    nodata: Option<f64>,
    crs: Option<Crs>,
    transform: GeoTransform,
}

impl RasterProfile {
    /// Create a validated profile.
    pub fn new(
        width: usize,
        height: usize,
        count: usize,
        dtype: DataType,
        nodata: Option<f64>,
        crs: Option<Crs>,
        transform: GeoTransform,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        if count == 0 {
            return Err(Error::Other("band count must be >= 1".into()));
        }

        Ok(Self {
            width,
            height,
            count,
            dtype,
            nodata,
            crs,
            transform,
        })
    }

    /// Profile of a single-band grid, taking geometry and metadata from
    /// the raster itself.
    pub fn of<T: RasterElement>(raster: &Raster<T>) -> Result<Self> {
        Self::new(
            raster.cols(),
            raster.rows(),
            1,
            T::data_type(),
            raster.nodata().and_then(|nd| nd.to_f64()),
            raster.crs().cloned(),
            *raster.transform(),
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Replace the dtype/nodata pair, keeping geometry.
    ///
    /// Used when a stage changes the storage convention of its output
    /// (e.g. index maps are persisted as float32 with nodata -9999).
    pub fn with_storage(&self, dtype: DataType, nodata: Option<f64>) -> Self {
        Self {
            dtype,
            nodata,
            ..self.clone()
        }
    }

    /// Check the width/height invariant against a pixel grid.
    pub fn matches_grid<T: RasterElement>(&self, raster: &Raster<T>) -> Result<()> {
        if raster.rows() != self.height || raster.cols() != self.width {
            return Err(Error::SizeMismatch {
                er: self.height,
                ec: self.width,
                ar: raster.rows(),
                ac: raster.cols(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_dimensions() {
        let result = RasterProfile::new(
            0,
            10,
            1,
            DataType::Float32,
            None,
            None,
            GeoTransform::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_of_raster() {
        let mut raster: Raster<f32> = Raster::new(20, 30);
        raster.set_nodata(Some(-9999.0));
        raster.set_crs(Some(Crs::Epsg(32633)));

        let profile = RasterProfile::of(&raster).unwrap();
        assert_eq!(profile.width(), 30);
        assert_eq!(profile.height(), 20);
        assert_eq!(profile.count(), 1);
        assert_eq!(profile.dtype(), DataType::Float32);
        assert_eq!(profile.nodata(), Some(-9999.0));
    }

    #[test]
    fn test_matches_grid() {
        let raster: Raster<f64> = Raster::new(5, 6);
        let profile = RasterProfile::of(&raster).unwrap();

        assert!(profile.matches_grid(&raster).is_ok());

        let other: Raster<f64> = Raster::new(6, 5);
        assert!(profile.matches_grid(&other).is_err());
    }
}
