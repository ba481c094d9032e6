//! Band resampling to a target ground resolution
//!
//! Rescales a band's pixel grid so that the output pixel size equals the
//! requested `(xres, yres)` exactly, composing the affine transform with
//! the inverse grid scale so corner world coordinates are preserved.

use crate::maybe_rayon::*;
use lakescan_core::raster::{Raster, RasterElement};
use lakescan_core::{Algorithm, Error, Result};

/// Interpolation kernel used to fill the output grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResamplingKernel {
    /// Nearest-neighbor lookup
    Nearest,
    /// Bilinear interpolation over the 2x2 neighborhood
    #[default]
    Bilinear,
    /// Catmull-Rom cubic interpolation over the 4x4 neighborhood
    Cubic,
}

/// Parameters for resampling
#[derive(Debug, Clone)]
pub struct ResampleParams {
    /// Target ground resolution as (xres, yres), both > 0
    pub resolution: (f64, f64),
    /// Interpolation kernel
    pub kernel: ResamplingKernel,
}

impl Default for ResampleParams {
    fn default() -> Self {
        Self {
            resolution: (60.0, 60.0),
            kernel: ResamplingKernel::default(),
        }
    }
}

/// Resampling algorithm
#[derive(Debug, Clone, Default)]
pub struct Resample;

impl Algorithm for Resample {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = ResampleParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Resample"
    }

    fn description(&self) -> &'static str {
        "Rescale a band's pixel grid to a target ground resolution"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        resample_res(&input, params.resolution.0, params.resolution.1, params.kernel)
    }
}

/// Resample a band to the given ground resolution.
///
/// Output dimensions are the scaled source dimensions rounded half-up
/// (never below 1). The output transform carries the exact target pixel
/// size; sampling positions use the realized grid ratio so the samples
/// span the full source extent.
///
/// Nodata cells do not bleed: interpolating kernels renormalize their
/// weights over valid taps and return nodata only when every tap is
/// invalid.
pub fn resample_res(
    raster: &Raster<f64>,
    xres: f64,
    yres: f64,
    kernel: ResamplingKernel,
) -> Result<Raster<f64>> {
    if xres <= 0.0 || yres <= 0.0 {
        return Err(Error::InvalidResolution { xres, yres });
    }

    let (cur_xres, cur_yres) = raster.resolution();
    let scale_x = cur_xres / xres;
    let scale_y = cur_yres / yres;

    let (rows, cols) = raster.shape();
    let out_rows = ((rows as f64 * scale_y).round() as usize).max(1);
    let out_cols = ((cols as f64 * scale_x).round() as usize).max(1);

    let row_ratio = rows as f64 / out_rows as f64;
    let col_ratio = cols as f64 / out_cols as f64;
    let nodata = raster.nodata();

    let data: Vec<f64> = (0..out_rows)
        .into_par_iter()
        .flat_map(|out_row| {
            let src_row = (out_row as f64 + 0.5) * row_ratio - 0.5;
            let mut row_data = vec![0.0f64; out_cols];

            for (out_col, cell) in row_data.iter_mut().enumerate() {
                let src_col = (out_col as f64 + 0.5) * col_ratio - 0.5;

                *cell = match kernel {
                    ResamplingKernel::Nearest => sample_nearest(raster, src_row, src_col),
                    ResamplingKernel::Bilinear => {
                        sample_bilinear(raster, src_row, src_col, nodata)
                    }
                    ResamplingKernel::Cubic => sample_cubic(raster, src_row, src_col, nodata),
                };
            }

            row_data
        })
        .collect();

    let mut output = Raster::from_vec(data, out_rows, out_cols)?;
    output.set_transform(raster.transform().scaled(1.0 / scale_x, 1.0 / scale_y));
    output.set_crs(raster.crs().cloned());
    output.set_nodata(nodata);

    Ok(output)
}

fn clamp_index(value: isize, upper: usize) -> usize {
    value.clamp(0, upper as isize - 1) as usize
}

fn sample_nearest(raster: &Raster<f64>, src_row: f64, src_col: f64) -> f64 {
    let row = clamp_index(src_row.round() as isize, raster.rows());
    let col = clamp_index(src_col.round() as isize, raster.cols());
    unsafe { raster.get_unchecked(row, col) }
}

fn sample_bilinear(raster: &Raster<f64>, src_row: f64, src_col: f64, nodata: Option<f64>) -> f64 {
    let r0 = src_row.floor();
    let c0 = src_col.floor();
    let fr = src_row - r0;
    let fc = src_col - c0;

    let row_weights = [(r0 as isize, 1.0 - fr), (r0 as isize + 1, fr)];
    let col_weights = [(c0 as isize, 1.0 - fc), (c0 as isize + 1, fc)];

    weighted_sample(raster, &row_weights, &col_weights, nodata)
}

/// Catmull-Rom weight for a tap at integer offset `i - 1` given fraction `f`
fn cubic_weights(f: f64) -> [f64; 4] {
    let f2 = f * f;
    let f3 = f2 * f;
    [
        -0.5 * f3 + f2 - 0.5 * f,
        1.5 * f3 - 2.5 * f2 + 1.0,
        -1.5 * f3 + 2.0 * f2 + 0.5 * f,
        0.5 * f3 - 0.5 * f2,
    ]
}

fn sample_cubic(raster: &Raster<f64>, src_row: f64, src_col: f64, nodata: Option<f64>) -> f64 {
    let r0 = src_row.floor();
    let c0 = src_col.floor();
    let wr = cubic_weights(src_row - r0);
    let wc = cubic_weights(src_col - c0);

    let row_weights: Vec<(isize, f64)> = (0..4)
        .map(|i| (r0 as isize + i as isize - 1, wr[i]))
        .collect();
    let col_weights: Vec<(isize, f64)> = (0..4)
        .map(|i| (c0 as isize + i as isize - 1, wc[i]))
        .collect();

    weighted_sample(raster, &row_weights, &col_weights, nodata)
}

/// Separable weighted sum over the tap grid, skipping invalid taps and
/// renormalizing. Taps outside the raster are clamped to the edge.
fn weighted_sample(
    raster: &Raster<f64>,
    row_weights: &[(isize, f64)],
    col_weights: &[(isize, f64)],
    nodata: Option<f64>,
) -> f64 {
    let mut sum = 0.0;
    let mut weight_total = 0.0;

    for &(r, wr) in row_weights {
        let row = clamp_index(r, raster.rows());
        for &(c, wc) in col_weights {
            let col = clamp_index(c, raster.cols());
            let value = unsafe { raster.get_unchecked(row, col) };
            if value.is_nodata(nodata) {
                continue;
            }
            let w = wr * wc;
            sum += w * value;
            weight_total += w;
        }
    }

    if weight_total.abs() < 1e-12 {
        nodata.unwrap_or(f64::NAN)
    } else {
        sum / weight_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lakescan_core::GeoTransform;

    fn band_10m(rows: usize, cols: usize) -> Raster<f64> {
        let mut raster = Raster::new(rows, cols);
        raster.set_transform(GeoTransform::new(500_000.0, 4_600_000.0, 10.0, -10.0));
        for row in 0..rows {
            for col in 0..cols {
                raster.set(row, col, (row * cols + col) as f64).unwrap();
            }
        }
        raster
    }

    #[test]
    fn test_target_resolution_is_exact() {
        let band = band_10m(60, 60);
        let out = resample_res(&band, 60.0, 60.0, ResamplingKernel::Bilinear).unwrap();

        let (xres, yres) = out.resolution();
        assert_relative_eq!(xres, 60.0, epsilon = 1e-6);
        assert_relative_eq!(yres, 60.0, epsilon = 1e-6);
        assert_eq!(out.shape(), (10, 10));

        // Corner world coordinates preserved
        assert_relative_eq!(out.transform().origin_x, 500_000.0);
        assert_relative_eq!(out.transform().origin_y, 4_600_000.0);
    }

    #[test]
    fn test_dimensions_round_half_up() {
        // 10 px at 10m -> 60m: 10 * (10/60) = 1.667 -> 2
        let band = band_10m(10, 10);
        let out = resample_res(&band, 60.0, 60.0, ResamplingKernel::Nearest).unwrap();
        assert_eq!(out.shape(), (2, 2));

        // 9 px at 10m -> 60m: 1.5 -> 2 (half-up)
        let band = band_10m(9, 9);
        let out = resample_res(&band, 60.0, 60.0, ResamplingKernel::Nearest).unwrap();
        assert_eq!(out.shape(), (2, 2));
    }

    #[test]
    fn test_resample_is_stable_at_same_resolution() {
        let band = band_10m(30, 30);
        let once = resample_res(&band, 60.0, 60.0, ResamplingKernel::Bilinear).unwrap();
        let twice = resample_res(&once, 60.0, 60.0, ResamplingKernel::Bilinear).unwrap();

        assert_eq!(once.shape(), twice.shape());
        assert_eq!(once.transform(), twice.transform());
        for row in 0..once.rows() {
            for col in 0..once.cols() {
                assert_relative_eq!(
                    once.get(row, col).unwrap(),
                    twice.get(row, col).unwrap(),
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn test_invalid_resolution() {
        let band = band_10m(4, 4);
        assert!(matches!(
            resample_res(&band, 0.0, 60.0, ResamplingKernel::Bilinear),
            Err(Error::InvalidResolution { .. })
        ));
        assert!(matches!(
            resample_res(&band, 60.0, -10.0, ResamplingKernel::Bilinear),
            Err(Error::InvalidResolution { .. })
        ));
    }

    #[test]
    fn test_constant_field_survives_every_kernel() {
        let mut band = Raster::filled(12, 12, 7.5);
        band.set_transform(GeoTransform::new(0.0, 120.0, 10.0, -10.0));

        for kernel in [
            ResamplingKernel::Nearest,
            ResamplingKernel::Bilinear,
            ResamplingKernel::Cubic,
        ] {
            let out = resample_res(&band, 30.0, 30.0, kernel).unwrap();
            assert_eq!(out.shape(), (4, 4));
            for row in 0..4 {
                for col in 0..4 {
                    assert_relative_eq!(out.get(row, col).unwrap(), 7.5, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_nearest_picks_source_values() {
        let band = band_10m(6, 6);
        let out = resample_res(&band, 20.0, 20.0, ResamplingKernel::Nearest).unwrap();

        assert_eq!(out.shape(), (3, 3));
        for row in 0..3 {
            for col in 0..3 {
                let v = out.get(row, col).unwrap();
                assert!(
                    band.data().iter().any(|&s| (s - v).abs() < 1e-12),
                    "nearest produced a value not present in the source: {}",
                    v
                );
            }
        }
    }

    #[test]
    fn test_nodata_does_not_bleed() {
        let mut band = Raster::filled(8, 8, 4.0);
        band.set_transform(GeoTransform::new(0.0, 80.0, 10.0, -10.0));
        band.set_nodata(Some(-9999.0));
        band.set(3, 3, -9999.0).unwrap();

        let out = resample_res(&band, 20.0, 20.0, ResamplingKernel::Bilinear).unwrap();
        for row in 0..out.rows() {
            for col in 0..out.cols() {
                let v = out.get(row, col).unwrap();
                assert_relative_eq!(v, 4.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_upscaling_bilinear_interpolates() {
        // 2x2 grid upscaled 2x: centers must interpolate between corners.
        let mut band = Raster::from_vec(vec![0.0, 10.0, 20.0, 30.0], 2, 2).unwrap();
        band.set_transform(GeoTransform::new(0.0, 20.0, 10.0, -10.0));

        let out = resample_res(&band, 5.0, 5.0, ResamplingKernel::Bilinear).unwrap();
        assert_eq!(out.shape(), (4, 4));

        // Values stay within the source range and increase along each axis.
        for row in 0..4 {
            for col in 0..4 {
                let v = out.get(row, col).unwrap();
                assert!((0.0..=30.0).contains(&v));
            }
        }
        assert!(out.get(0, 0).unwrap() < out.get(0, 3).unwrap());
        assert!(out.get(0, 0).unwrap() < out.get(3, 0).unwrap());
    }

    #[test]
    fn test_algorithm_wrapper() {
        let band = band_10m(12, 12);
        let out = Resample
            .execute(
                band,
                ResampleParams {
                    resolution: (30.0, 30.0),
                    kernel: ResamplingKernel::Nearest,
                },
            )
            .unwrap();
        assert_eq!(out.shape(), (4, 4));
    }
}
