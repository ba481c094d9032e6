//! Affine geotransformation for rasters

use serde::{Deserialize, Serialize};

/// Affine transformation coefficients mapping pixel to world coordinates.
///
/// ```text
/// x = origin_x + col * pixel_width  + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// For north-up images the rotation terms are 0 and `pixel_height` is
/// negative (row indices grow southward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Pixel width (cell size in X direction)
    pub pixel_width: f64,
    /// Pixel height (cell size in Y direction, usually negative)
    pub pixel_height: f64,
    /// Rotation about X axis (usually 0)
    pub row_rotation: f64,
    /// Rotation about Y axis (usually 0)
    pub col_rotation: f64,
}

impl GeoTransform {
    /// Create a north-up transform (no rotation)
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// Create from GDAL-style array
    /// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`
    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            origin_x: coeffs[0],
            pixel_width: coeffs[1],
            row_rotation: coeffs[2],
            origin_y: coeffs[3],
            col_rotation: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    /// Convert to GDAL-style array
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// Apply the transform to fractional pixel coordinates.
    ///
    /// `(0.0, 0.0)` maps to the world coordinate of the raster's top-left
    /// corner; integer inputs map to cell corners, `col + 0.5 / row + 0.5`
    /// to cell centers.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.origin_x + col * self.pixel_width + row * self.row_rotation;
        let y = self.origin_y + col * self.col_rotation + row * self.pixel_height;
        (x, y)
    }

    /// World coordinate of the center of pixel `(col, row)`
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Convert world coordinates to fractional pixel coordinates.
    ///
    /// Use `.floor()` on the result to obtain integer indices. Returns NaN
    /// coordinates when the transform is degenerate (zero determinant).
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let det = self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation;

        if det.abs() < 1e-10 {
            return (f64::NAN, f64::NAN);
        }

        let dx = x - self.origin_x;
        let dy = y - self.origin_y;

        let col = (self.pixel_height * dx - self.row_rotation * dy) / det;
        let row = (-self.col_rotation * dx + self.pixel_width * dy) / det;

        (col, row)
    }

    /// Absolute pixel size as `(xres, yres)`
    pub fn resolution(&self) -> (f64, f64) {
        (self.pixel_width.abs(), self.pixel_height.abs())
    }

    /// Compose with a pixel-space scaling.
    ///
    /// Equivalent to `transform * scale(sx, sy)` in rasterio terms: a grid
    /// whose pixel indices are scaled by `(sx, sy)` keeps the same corner
    /// world coordinates. Used by resampling, where `(sx, sy)` is the
    /// inverse of the grid scale factor.
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self {
            origin_x: self.origin_x,
            origin_y: self.origin_y,
            pixel_width: self.pixel_width * sx,
            pixel_height: self.pixel_height * sy,
            row_rotation: self.row_rotation * sy,
            col_rotation: self.col_rotation * sx,
        }
    }

    /// Same transform with the translation terms replaced.
    ///
    /// Used by cropping, where the output grid starts at a new top-left
    /// world coordinate but keeps pixel size and rotation.
    pub fn with_origin(&self, origin_x: f64, origin_y: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            ..*self
        }
    }

    /// Bounding box `(min_x, min_y, max_x, max_y)` for a raster of the
    /// given dimensions
    pub fn bounds(&self, width: usize, height: usize) -> (f64, f64, f64, f64) {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(width as f64, 0.0),
            self.apply(0.0, height as f64),
            self.apply(width as f64, height as f64),
        ];

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for (x, y) in corners {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        (min_x, min_y, max_x, max_y)
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pixel_to_geo_roundtrip() {
        let gt = GeoTransform::new(100.0, 200.0, 10.0, -10.0);

        let (x, y) = gt.pixel_to_geo(5, 10);
        let (col, row) = gt.geo_to_pixel(x, y);

        assert_relative_eq!(col, 5.5, epsilon = 1e-10);
        assert_relative_eq!(row, 10.5, epsilon = 1e-10);
    }

    #[test]
    fn test_bounds() {
        let gt = GeoTransform::new(0.0, 100.0, 1.0, -1.0);
        let (min_x, min_y, max_x, max_y) = gt.bounds(100, 100);

        assert_relative_eq!(min_x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(min_y, 0.0, epsilon = 1e-10);
        assert_relative_eq!(max_x, 100.0, epsilon = 1e-10);
        assert_relative_eq!(max_y, 100.0, epsilon = 1e-10);
    }

    #[test]
    fn test_scaled_preserves_corners() {
        // Resampling 10m pixels to 60m: grid shrinks by 6, pixels grow by 6.
        let gt = GeoTransform::new(500_000.0, 4_600_000.0, 10.0, -10.0);
        let scaled = gt.scaled(6.0, 6.0);

        assert_relative_eq!(scaled.pixel_width, 60.0);
        assert_relative_eq!(scaled.pixel_height, -60.0);
        // Corner (0,0) unchanged; old corner (60,60) == new corner (10,10).
        assert_eq!(scaled.apply(0.0, 0.0), gt.apply(0.0, 0.0));
        assert_eq!(scaled.apply(10.0, 10.0), gt.apply(60.0, 60.0));
    }

    #[test]
    fn test_with_origin() {
        let gt = GeoTransform::new(0.0, 0.0, 10.0, -10.0);
        let shifted = gt.with_origin(300.0, -200.0);

        assert_eq!(shifted.origin_x, 300.0);
        assert_eq!(shifted.origin_y, -200.0);
        assert_eq!(shifted.pixel_width, 10.0);
        assert_eq!(shifted.pixel_height, -10.0);
    }
}
