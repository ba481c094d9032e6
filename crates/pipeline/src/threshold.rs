//! Thresholding index maps into binary masks

use crate::maybe_rayon::*;
use lakescan_core::raster::{Raster, RasterElement};

/// Mask value for foreground cells
pub const FOREGROUND: u8 = 1;
/// Mask value for background cells
pub const BACKGROUND: u8 = 0;

/// Which side of the threshold is the foreground class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Values strictly above the threshold are foreground
    Above,
    /// Values strictly below the threshold are foreground
    Below,
}

/// Threshold an index map into a binary mask.
///
/// Pure elementwise comparison; the mask keeps the input's transform and
/// CRS. Nodata and non-finite cells are always background.
pub fn threshold_mask(index: &Raster<f64>, threshold: f64, polarity: Polarity) -> Raster<u8> {
    let (rows, cols) = index.shape();
    let nodata = index.nodata();

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![BACKGROUND; cols];
            for (col, cell) in row_data.iter_mut().enumerate() {
                let value = unsafe { index.get_unchecked(row, col) };
                if !value.is_finite() || value.is_nodata(nodata) {
                    continue;
                }

                let foreground = match polarity {
                    Polarity::Above => value > threshold,
                    Polarity::Below => value < threshold,
                };
                if foreground {
                    *cell = FOREGROUND;
                }
            }
            row_data
        })
        .collect();

    let mut mask: Raster<u8> = index.with_same_meta(rows, cols);
    *mask.data_mut() = ndarray::Array2::from_shape_vec((rows, cols), data)
        .expect("row-major buffer matches shape");
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_map() -> Raster<f64> {
        Raster::from_vec(vec![0.1, 0.5, 0.9, -0.2], 2, 2).unwrap()
    }

    #[test]
    fn test_above_polarity() {
        let mask = threshold_mask(&index_map(), 0.3, Polarity::Above);

        assert_eq!(mask.get(0, 0).unwrap(), 0);
        assert_eq!(mask.get(0, 1).unwrap(), 1);
        assert_eq!(mask.get(1, 0).unwrap(), 1);
        assert_eq!(mask.get(1, 1).unwrap(), 0);
    }

    #[test]
    fn test_below_polarity() {
        let mask = threshold_mask(&index_map(), 0.3, Polarity::Below);

        assert_eq!(mask.get(0, 0).unwrap(), 1);
        assert_eq!(mask.get(0, 1).unwrap(), 0);
        assert_eq!(mask.get(1, 0).unwrap(), 0);
        assert_eq!(mask.get(1, 1).unwrap(), 1);
    }

    #[test]
    fn test_threshold_value_itself_is_background() {
        let index = Raster::from_vec(vec![0.3; 4], 2, 2).unwrap();

        let above = threshold_mask(&index, 0.3, Polarity::Above);
        let below = threshold_mask(&index, 0.3, Polarity::Below);
        assert_eq!(above.get(0, 0).unwrap(), 0);
        assert_eq!(below.get(0, 0).unwrap(), 0);
    }

    #[test]
    fn test_nodata_is_background() {
        let mut index = Raster::from_vec(vec![0.9, -9999.0, f64::NAN, 0.9], 2, 2).unwrap();
        index.set_nodata(Some(-9999.0));

        let mask = threshold_mask(&index, 0.3, Polarity::Above);
        assert_eq!(mask.get(0, 0).unwrap(), 1);
        assert_eq!(mask.get(0, 1).unwrap(), 0);
        assert_eq!(mask.get(1, 0).unwrap(), 0);
        assert_eq!(mask.get(1, 1).unwrap(), 1);
    }

    #[test]
    fn test_mask_inherits_geometry() {
        let mut index = index_map();
        index.set_transform(lakescan_core::GeoTransform::new(10.0, 20.0, 60.0, -60.0));

        let mask = threshold_mask(&index, 0.3, Polarity::Above);
        assert_eq!(mask.transform(), index.transform());
        assert_eq!(mask.shape(), index.shape());
    }
}
