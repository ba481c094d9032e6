//! # lakescan core
//!
//! Core types, traits and I/O for the lakescan water-body extraction
//! pipeline.
//!
//! This crate provides:
//! - `Raster<T>`: generic georeferenced raster grid
//! - `GeoTransform`: affine transformation for georeferencing
//! - `RasterProfile`: typed raster metadata (no loose dictionaries)
//! - `BandCode` / `Band` / `BandStack`: spectral band model
//! - `Crs`: coordinate reference system identifiers
//! - Raster I/O (native GeoTIFF, optional GDAL) and GeoJSON vector I/O

pub mod band;
pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod vector;

pub use band::{Band, BandCode, BandStack};
pub use crs::Crs;
pub use error::{Error, Result};
pub use raster::{DataType, GeoTransform, Raster, RasterElement, RasterProfile};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::band::{Band, BandCode, BandStack};
    pub use crate::crs::Crs;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{DataType, GeoTransform, Raster, RasterElement, RasterProfile};
    pub use crate::Algorithm;
}

/// Core trait for pipeline stages with parameter structs.
///
/// Stages are pure functions over immutable inputs; an `Algorithm`
/// value is just a name attached to one, so runners can list and time
/// stages uniformly.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
