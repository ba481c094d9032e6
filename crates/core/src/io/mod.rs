//! Reading and writing georeferenced rasters
//!
//! The raster storage backend is a collaborator, not part of the
//! pipeline: stages only see `Raster` values. The default backend uses
//! the pure-Rust `tiff` crate; the `gdal` feature swaps in GDAL for
//! full-fidelity profiles.

#[cfg(feature = "gdal")]
mod gdal_io;
mod native;

#[cfg(feature = "gdal")]
pub use gdal_io::{read_geotiff, write_geotiff, GeoTiffOptions};

#[cfg(not(feature = "gdal"))]
pub use native::{read_geotiff, write_geotiff, GeoTiffOptions};

// Buffer-based I/O (always available, no filesystem dependency)
pub use native::{read_geotiff_from_buffer, write_geotiff_to_buffer};
