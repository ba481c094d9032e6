//! Error types for lakescan

use thiserror::Error;

/// Main error type for lakescan operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("CRS mismatch: {0} vs {1}")]
    CrsMismatch(String, String),

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid resample resolution ({xres}, {yres}): both components must be > 0")]
    InvalidResolution { xres: f64, yres: f64 },

    #[error("Crop region does not intersect the raster extent")]
    EmptyCropRegion,

    #[error("No band files in input collection")]
    NoBandsFound,

    #[error(
        "Band {band} has shape ({rows}, {cols}), expected ({expected_rows}, {expected_cols})"
    )]
    InconsistentShape {
        band: String,
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("Unknown band code: {0:?}")]
    UnknownBandCode(String),

    #[error("No polygons available for nearest-distance matching")]
    NoPolygonsAvailable,

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "gdal")]
impl From<gdal::errors::GdalError> for Error {
    fn from(e: gdal::errors::GdalError) -> Self {
        Error::Gdal(e.to_string())
    }
}

/// Result type alias for lakescan operations
pub type Result<T> = std::result::Result<T, Error>;
