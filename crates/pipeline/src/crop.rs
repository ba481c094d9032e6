//! Cropping a band to a polygon region
//!
//! Clips a band to the minimal pixel window covering a set of polygons.
//! Pixels inside the window but outside every polygon are set to the
//! band's nodata value (zero when undefined); the output transform is
//! shifted to the window's top-left world coordinate.

use crate::maybe_rayon::*;
use geo::{BoundingRect, Intersects, Point, Polygon, Rect};
use lakescan_core::raster::Raster;
use lakescan_core::{Error, Result};

/// Crop a band to the union of the given polygons.
///
/// Fails with [`Error::EmptyCropRegion`] when the polygon bounds do not
/// intersect the raster extent (zero-area window), or when `polygons`
/// is empty.
pub fn crop_to_polygons(raster: &Raster<f64>, polygons: &[Polygon<f64>]) -> Result<Raster<f64>> {
    let region = union_bounds(polygons).ok_or(Error::EmptyCropRegion)?;

    let (rows, cols) = raster.shape();
    let window = pixel_window(raster, &region, rows, cols)?;
    let (row_start, row_end, col_start, col_end) = window;

    let out_rows = row_end - row_start;
    let out_cols = col_end - col_start;
    let fill = raster.nodata().unwrap_or(0.0);
    let transform = *raster.transform();

    let data: Vec<f64> = (0..out_rows)
        .into_par_iter()
        .flat_map(|out_row| {
            let row = row_start + out_row;
            let mut row_data = vec![fill; out_cols];

            for (out_col, cell) in row_data.iter_mut().enumerate() {
                let col = col_start + out_col;
                let (x, y) = transform.pixel_to_geo(col, row);
                let center = Point::new(x, y);

                if polygons.iter().any(|polygon| polygon.intersects(&center)) {
                    *cell = unsafe { raster.get_unchecked(row, col) };
                }
            }

            row_data
        })
        .collect();

    let (origin_x, origin_y) = transform.apply(col_start as f64, row_start as f64);

    let mut output = Raster::from_vec(data, out_rows, out_cols)?;
    output.set_transform(transform.with_origin(origin_x, origin_y));
    output.set_crs(raster.crs().cloned());
    output.set_nodata(raster.nodata());

    Ok(output)
}

/// Combined bounding rectangle of all polygons
fn union_bounds(polygons: &[Polygon<f64>]) -> Option<Rect<f64>> {
    let mut combined: Option<Rect<f64>> = None;

    for polygon in polygons {
        let rect = polygon.bounding_rect()?;
        combined = Some(match combined {
            None => rect,
            Some(acc) => Rect::new(
                (acc.min().x.min(rect.min().x), acc.min().y.min(rect.min().y)),
                (acc.max().x.max(rect.max().x), acc.max().y.max(rect.max().y)),
            ),
        });
    }

    combined
}

/// Pixel window `(row_start, row_end, col_start, col_end)` covering the
/// region, clamped to the raster; errors when the clamped window is empty.
fn pixel_window(
    raster: &Raster<f64>,
    region: &Rect<f64>,
    rows: usize,
    cols: usize,
) -> Result<(usize, usize, usize, usize)> {
    let corners = [
        (region.min().x, region.min().y),
        (region.min().x, region.max().y),
        (region.max().x, region.min().y),
        (region.max().x, region.max().y),
    ];

    let mut col_min = f64::INFINITY;
    let mut col_max = f64::NEG_INFINITY;
    let mut row_min = f64::INFINITY;
    let mut row_max = f64::NEG_INFINITY;

    for (x, y) in corners {
        let (col, row) = raster.geo_to_pixel(x, y);
        col_min = col_min.min(col);
        col_max = col_max.max(col);
        row_min = row_min.min(row);
        row_max = row_max.max(row);
    }

    let col_start = col_min.floor().max(0.0) as usize;
    let row_start = row_min.floor().max(0.0) as usize;
    let col_end = (col_max.ceil().max(0.0) as usize).min(cols);
    let row_end = (row_max.ceil().max(0.0) as usize).min(rows);

    if col_start >= col_end || row_start >= row_end {
        return Err(Error::EmptyCropRegion);
    }

    Ok((row_start, row_end, col_start, col_end))
}
