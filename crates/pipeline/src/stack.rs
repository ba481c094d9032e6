//! Loading band files into a band stack
//!
//! Reads an ordered collection of band files, derives each band's code
//! from its filename, optionally resamples to a common resolution, and
//! validates that every band shares one grid shape.

use crate::resample::{resample_res, ResamplingKernel};
use lakescan_core::raster::Raster;
use lakescan_core::{io, Band, BandCode, BandStack, Error, Result};
use std::path::Path;

/// Parameters for stack loading
#[derive(Debug, Clone, Default)]
pub struct StackParams {
    /// Resample every band to this resolution before stacking
    pub resolution: Option<(f64, f64)>,
    /// Kernel used when resampling
    pub kernel: ResamplingKernel,
}

/// Load a band stack from band files.
///
/// Input paths are sorted lexicographically first, so the stack order is
/// deterministic regardless of how the caller discovered the files.
/// Fails with [`Error::NoBandsFound`] on an empty collection and with
/// [`Error::InconsistentShape`] when a band's grid does not match the
/// first band's.
pub fn load_band_stack<P: AsRef<Path>>(paths: &[P], params: &StackParams) -> Result<BandStack> {
    if paths.is_empty() {
        return Err(Error::NoBandsFound);
    }

    let mut sorted: Vec<&Path> = paths.iter().map(|p| p.as_ref()).collect();
    sorted.sort();

    let mut bands = Vec::with_capacity(sorted.len());
    for path in sorted {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::UnknownBandCode(path.display().to_string()))?;
        let code = BandCode::from_stem(stem)?;

        let mut grid: Raster<f64> = io::read_geotiff(path, None)?;
        if let Some((xres, yres)) = params.resolution {
            grid = resample_res(&grid, xres, yres, params.kernel)?;
        }

        bands.push(Band::new(code, grid));
    }

    BandStack::new(bands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lakescan_core::GeoTransform;
    use std::path::PathBuf;

    fn write_band_file(dir: &Path, name: &str, rows: usize, cols: usize, res: f64) -> PathBuf {
        let mut raster: Raster<f64> = Raster::filled(rows, cols, 1.0);
        raster.set_transform(GeoTransform::new(0.0, rows as f64 * res, res, -res));

        let path = dir.join(name);
        io::write_geotiff(&raster, &path, None).unwrap();
        path
    }

    #[test]
    fn test_empty_collection_fails() {
        let paths: Vec<PathBuf> = vec![];
        assert!(matches!(
            load_band_stack(&paths, &StackParams::default()),
            Err(Error::NoBandsFound)
        ));
    }

    #[test]
    fn test_load_and_label() {
        let dir = tempfile::tempdir().unwrap();
        // Deliberately passed out of order; loading sorts lexicographically.
        let b08 = write_band_file(dir.path(), "scene_B08.tif", 5, 5, 10.0);
        let b04 = write_band_file(dir.path(), "scene_B04.tif", 5, 5, 10.0);

        let stack = load_band_stack(&[b08, b04], &StackParams::default()).unwrap();

        assert_eq!(stack.len(), 2);
        assert_eq!(stack.codes(), vec![BandCode::B04, BandCode::B08]);
        assert_eq!(stack.shape(), (5, 5));
    }

    #[test]
    fn test_shape_mismatch_names_offender() {
        let dir = tempfile::tempdir().unwrap();
        let b04 = write_band_file(dir.path(), "B04.tif", 5, 5, 10.0);
        let b08 = write_band_file(dir.path(), "B08.tif", 4, 5, 10.0);

        match load_band_stack(&[b04, b08], &StackParams::default()) {
            Err(Error::InconsistentShape { band, .. }) => assert_eq!(band, "B08"),
            other => panic!("expected InconsistentShape, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_code_fails() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write_band_file(dir.path(), "scene_thumbnail.tif", 5, 5, 10.0);

        assert!(matches!(
            load_band_stack(&[bad], &StackParams::default()),
            Err(Error::UnknownBandCode(_))
        ));
    }

    #[test]
    fn test_resample_on_load_harmonizes_shapes() {
        let dir = tempfile::tempdir().unwrap();
        // 10m and 20m bands of the same extent
        let b04 = write_band_file(dir.path(), "B04.tif", 12, 12, 10.0);
        let b11 = write_band_file(dir.path(), "B11.tif", 6, 6, 20.0);

        let params = StackParams {
            resolution: Some((60.0, 60.0)),
            kernel: ResamplingKernel::Bilinear,
        };
        let stack = load_band_stack(&[b04, b11], &params).unwrap();

        assert_eq!(stack.shape(), (2, 2));
        let (xres, yres) = stack.band(BandCode::B04).unwrap().grid().resolution();
        assert!((xres - 60.0).abs() < 1e-6);
        assert!((yres - 60.0).abs() < 1e-6);
    }
}
