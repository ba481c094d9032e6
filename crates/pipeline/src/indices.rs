//! Normalized-difference index maps
//!
//! NDVI and NDWI computed from a band stack, with formula selection
//! driven by which bands are present. A stack lacking the required bands
//! yields "unavailable" (`None`), never an error and never a partial
//! result.
//!
//! Division-by-zero convention: any element whose ratio would be NaN or
//! infinite becomes exactly 0.

use crate::maybe_rayon::*;
use lakescan_core::raster::Raster;
use lakescan_core::{BandCode, BandStack, DataType, RasterProfile, Result};

/// Nodata sentinel used when persisting index maps
pub const INDEX_NODATA: f64 = -9999.0;

/// Which normalized-difference index to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Normalized Difference Vegetation Index: (B08 - B04) / (B08 + B04)
    Ndvi,
    /// Normalized Difference Water Index: (B03 - B8A) / (B03 + B8A),
    /// falling back to (B8A - SWIR) / (B8A + SWIR) when B03 is absent
    Ndwi,
}

impl IndexKind {
    /// Lowercase label used in filenames and logs
    pub fn label(&self) -> &'static str {
        match self {
            IndexKind::Ndvi => "ndvi",
            IndexKind::Ndwi => "ndwi",
        }
    }
}

/// A computed index map: one float grid in [-1, 1] plus its kind
#[derive(Debug, Clone)]
pub struct IndexMap {
    kind: IndexKind,
    grid: Raster<f64>,
}

impl IndexMap {
    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn grid(&self) -> &Raster<f64> {
        &self.grid
    }

    pub fn into_grid(self) -> Raster<f64> {
        self.grid
    }

    /// Persistence profile: single band, float32, nodata -9999
    pub fn profile(&self) -> Result<RasterProfile> {
        let profile = RasterProfile::of(&self.grid)?;
        Ok(profile.with_storage(DataType::Float32, Some(INDEX_NODATA)))
    }
}

/// Compute an index map from a band stack.
///
/// Returns `None` when the stack lacks the bands the formula needs:
///
/// - NDVI requires B04 (red) and B08 (NIR).
/// - NDWI prefers the standard formula over B03 (green) and B8A (NIR);
///   only when B03 is absent does it fall back to the approximate
///   formula over B8A and a SWIR band, preferring B12 over B11.
pub fn compute_index(stack: &BandStack, kind: IndexKind) -> Option<IndexMap> {
    let grid = match kind {
        IndexKind::Ndvi => {
            let red = stack.band(BandCode::B04)?;
            let nir = stack.band(BandCode::B08)?;
            normalized_difference(nir.grid(), red.grid())
        }
        IndexKind::Ndwi => {
            if stack.contains(BandCode::B03) {
                let green = stack.band(BandCode::B03)?;
                let nir = stack.band(BandCode::B8A)?;
                normalized_difference(green.grid(), nir.grid())
            } else {
                let nir = stack.band(BandCode::B8A)?;
                let swir = stack
                    .band(BandCode::B12)
                    .or_else(|| stack.band(BandCode::B11))?;
                normalized_difference(nir.grid(), swir.grid())
            }
        }
    };

    Some(IndexMap { kind, grid })
}

/// Elementwise `(a - b) / (a + b)` with non-finite results mapped to 0.
///
/// Inputs must share one shape; band stacks guarantee this.
fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Raster<f64> {
    debug_assert_eq!(band_a.shape(), band_b.shape());

    let (rows, cols) = band_a.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0.0f64; cols];
            for (col, cell) in row_data.iter_mut().enumerate() {
                let a = unsafe { band_a.get_unchecked(row, col) };
                let b = unsafe { band_b.get_unchecked(row, col) };

                let ratio = (a - b) / (a + b);
                if ratio.is_finite() {
                    *cell = ratio;
                }
            }
            row_data
        })
        .collect();

    let mut output: Raster<f64> = band_a.with_same_meta(rows, cols);
    output.set_nodata(Some(INDEX_NODATA));
    *output.data_mut() = ndarray::Array2::from_shape_vec((rows, cols), data)
        .expect("row-major buffer matches shape");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lakescan_core::{Band, GeoTransform};

    fn band(code: BandCode, values: Vec<f64>, rows: usize, cols: usize) -> Band {
        let mut grid = Raster::from_vec(values, rows, cols).unwrap();
        grid.set_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0));
        Band::new(code, grid)
    }

    fn uniform(code: BandCode, value: f64) -> Band {
        band(code, vec![value; 4], 2, 2)
    }

    #[test]
    fn test_ndvi_basic() {
        let stack = BandStack::new(vec![
            uniform(BandCode::B04, 0.1),
            uniform(BandCode::B08, 0.5),
        ])
        .unwrap();

        let index = compute_index(&stack, IndexKind::Ndvi).unwrap();
        assert_eq!(index.label(), "ndvi");

        let expected = (0.5 - 0.1) / (0.5 + 0.1);
        assert_relative_eq!(index.grid().get(0, 0).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_ndvi_missing_band_is_unavailable() {
        let stack = BandStack::new(vec![
            uniform(BandCode::B04, 0.1),
            uniform(BandCode::B03, 0.2),
        ])
        .unwrap();

        assert!(compute_index(&stack, IndexKind::Ndvi).is_none());
    }

    #[test]
    fn test_division_by_zero_maps_to_zero() {
        // NIR = Red = 5 -> denominator 10, numerator 0 -> 0.
        // NIR = Red = 0 -> 0/0 -> convention says exactly 0.
        // NIR = 5, Red = -5 -> 10/0 -> infinite -> 0.
        let stack = BandStack::new(vec![
            band(BandCode::B04, vec![5.0, 0.0, -5.0, 1.0], 2, 2),
            band(BandCode::B08, vec![5.0, 0.0, 5.0, 3.0], 2, 2),
        ])
        .unwrap();

        let index = compute_index(&stack, IndexKind::Ndvi).unwrap();
        assert_eq!(index.grid().get(0, 0).unwrap(), 0.0);
        assert_eq!(index.grid().get(0, 1).unwrap(), 0.0);
        assert_eq!(index.grid().get(1, 0).unwrap(), 0.0);
        assert_relative_eq!(index.grid().get(1, 1).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_values_stay_in_range() {
        let a: Vec<f64> = (0..16).map(|i| i as f64 * 0.05).collect();
        let b: Vec<f64> = (0..16).map(|i| 0.8 - i as f64 * 0.03).collect();
        let stack = BandStack::new(vec![
            band(BandCode::B04, a, 4, 4),
            band(BandCode::B08, b, 4, 4),
        ])
        .unwrap();

        let index = compute_index(&stack, IndexKind::Ndvi).unwrap();
        for row in 0..4 {
            for col in 0..4 {
                let v = index.grid().get(row, col).unwrap();
                assert!((-1.0..=1.0).contains(&v), "out of range: {}", v);
            }
        }
    }

    #[test]
    fn test_ndwi_standard_formula() {
        let stack = BandStack::new(vec![
            uniform(BandCode::B03, 0.3),
            uniform(BandCode::B8A, 0.1),
            uniform(BandCode::B12, 0.9), // present but must be ignored
        ])
        .unwrap();

        let index = compute_index(&stack, IndexKind::Ndwi).unwrap();
        let expected = (0.3 - 0.1) / (0.3 + 0.1);
        assert_relative_eq!(index.grid().get(0, 0).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_ndwi_fallback_prefers_b12() {
        let stack = BandStack::new(vec![
            uniform(BandCode::B8A, 0.4),
            uniform(BandCode::B11, 0.3),
            uniform(BandCode::B12, 0.1),
        ])
        .unwrap();

        let index = compute_index(&stack, IndexKind::Ndwi).unwrap();
        let expected = (0.4 - 0.1) / (0.4 + 0.1);
        assert_relative_eq!(index.grid().get(0, 0).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_ndwi_fallback_uses_b11_when_b12_absent() {
        let stack = BandStack::new(vec![
            uniform(BandCode::B8A, 0.4),
            uniform(BandCode::B11, 0.2),
        ])
        .unwrap();

        let index = compute_index(&stack, IndexKind::Ndwi).unwrap();
        let expected = (0.4 - 0.2) / (0.4 + 0.2);
        assert_relative_eq!(index.grid().get(0, 0).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_ndwi_green_without_nir_is_unavailable() {
        // B03 present selects the standard formula, which then fails on
        // the missing B8A; the fallback must not be attempted.
        let stack = BandStack::new(vec![
            uniform(BandCode::B03, 0.3),
            uniform(BandCode::B11, 0.2),
        ])
        .unwrap();

        assert!(compute_index(&stack, IndexKind::Ndwi).is_none());
    }

    #[test]
    fn test_ndwi_unavailable_without_any_formula() {
        let stack = BandStack::new(vec![uniform(BandCode::B04, 0.1)]).unwrap();
        assert!(compute_index(&stack, IndexKind::Ndwi).is_none());
    }

    #[test]
    fn test_index_profile_storage_convention() {
        let stack = BandStack::new(vec![
            uniform(BandCode::B04, 0.1),
            uniform(BandCode::B08, 0.5),
        ])
        .unwrap();

        let index = compute_index(&stack, IndexKind::Ndvi).unwrap();
        let profile = index.profile().unwrap();

        assert_eq!(profile.count(), 1);
        assert_eq!(profile.dtype(), DataType::Float32);
        assert_eq!(profile.nodata(), Some(INDEX_NODATA));
    }
}
