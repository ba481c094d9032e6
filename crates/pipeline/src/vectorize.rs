//! Mask vectorization: tracing foreground regions into polygons
//!
//! Converts a binary mask into one polygon per maximal connected region
//! of foreground pixels. Region growing uses 4-connectivity by default
//! (8-connectivity selectable); boundaries are traced along pixel edges,
//! so polygon vertices are pixel corners mapped through the mask's
//! affine transform. Holes are preserved as interior rings.

use geo::{Area, Coord, LineString, Polygon};
use lakescan_core::raster::Raster;
use lakescan_core::{Algorithm, Error, GeoTransform, Result};
use std::collections::HashMap;

/// Pixel adjacency rule for region growing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Edge-adjacent pixels belong to the same region
    #[default]
    Four,
    /// Edge- or corner-adjacent pixels belong to the same region
    Eight,
}

/// Parameters for vectorization
#[derive(Debug, Clone)]
pub struct VectorizeParams {
    /// Adjacency rule
    pub connectivity: Connectivity,
    /// Mask value treated as foreground
    pub foreground: u8,
}

impl Default for VectorizeParams {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::default(),
            foreground: 1,
        }
    }
}

/// Vectorization algorithm
#[derive(Debug, Clone, Default)]
pub struct Vectorize;

impl Algorithm for Vectorize {
    type Input = Raster<u8>;
    type Output = Vec<Polygon<f64>>;
    type Params = VectorizeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Vectorize"
    }

    fn description(&self) -> &'static str {
        "Trace foreground mask regions into world-coordinate polygons"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        Ok(vectorize_mask(&input, &params))
    }
}

/// Pixel-corner coordinate as (x = col, y = row)
type Corner = (i64, i64);

/// Vectorize a binary mask into polygons in world coordinates.
///
/// Regions are discovered in row-major scan order, so the output order
/// is deterministic. An all-background mask yields an empty vector, not
/// an error; callers treat "no regions" as a reportable condition.
/// Zero-area candidates are dropped.
pub fn vectorize_mask(mask: &Raster<u8>, params: &VectorizeParams) -> Vec<Polygon<f64>> {
    let (rows, cols) = mask.shape();
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    let foreground = params.foreground;
    let transform = *mask.transform();

    let neighbor_offsets: &[(isize, isize)] = match params.connectivity {
        Connectivity::Four => &[(-1, 0), (1, 0), (0, -1), (0, 1)],
        Connectivity::Eight => &[
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ],
    };

    // 0 = background or not yet visited; regions are labeled from 1
    let mut labels = vec![0u32; rows * cols];
    let mut next_label = 0u32;
    let mut polygons = Vec::new();

    for row in 0..rows {
        for col in 0..cols {
            if labels[row * cols + col] != 0
                || unsafe { mask.get_unchecked(row, col) } != foreground
            {
                continue;
            }

            next_label += 1;
            let label = next_label;
            let mut cells = Vec::new();
            let mut frontier = vec![(row, col)];
            labels[row * cols + col] = label;

            while let Some((r, c)) = frontier.pop() {
                cells.push((r, c));
                for &(dr, dc) in neighbor_offsets {
                    let nr = r as isize + dr;
                    let nc = c as isize + dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    let (nr, nc) = (nr as usize, nc as usize);
                    if labels[nr * cols + nc] == 0
                        && unsafe { mask.get_unchecked(nr, nc) } == foreground
                    {
                        labels[nr * cols + nc] = label;
                        frontier.push((nr, nc));
                    }
                }
            }

            polygons.extend(trace_component(&cells, &labels, label, rows, cols, &transform));
        }
    }

    polygons
}

/// Trace one labeled component's boundary into polygons.
///
/// Boundary edges are directed so the region interior lies on the right
/// of the direction of travel; chaining then prefers the left turn at
/// 4-valent corners, which keeps a pinched region's boundary as one
/// self-touching ring instead of splitting it.
fn trace_component(
    cells: &[(usize, usize)],
    labels: &[u32],
    label: u32,
    rows: usize,
    cols: usize,
    transform: &GeoTransform,
) -> Vec<Polygon<f64>> {
    let same = |r: isize, c: isize| -> bool {
        r >= 0
            && c >= 0
            && (r as usize) < rows
            && (c as usize) < cols
            && labels[r as usize * cols + c as usize] == label
    };

    // Directed boundary edges between pixel corners
    let mut edges: Vec<(Corner, Corner)> = Vec::new();
    for &(r, c) in cells {
        let (x, y) = (c as i64, r as i64);
        let (ri, ci) = (r as isize, c as isize);
        if !same(ri - 1, ci) {
            edges.push(((x, y), (x + 1, y)));
        }
        if !same(ri, ci + 1) {
            edges.push(((x + 1, y), (x + 1, y + 1)));
        }
        if !same(ri + 1, ci) {
            edges.push(((x + 1, y + 1), (x, y + 1)));
        }
        if !same(ri, ci - 1) {
            edges.push(((x, y + 1), (x, y)));
        }
    }

    let mut outgoing: HashMap<Corner, Vec<usize>> = HashMap::new();
    for (i, (start, _)) in edges.iter().enumerate() {
        outgoing.entry(*start).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut rings: Vec<Vec<Corner>> = Vec::new();

    for start_idx in 0..edges.len() {
        if used[start_idx] {
            continue;
        }

        let mut ring = vec![edges[start_idx].0];
        let mut current = start_idx;

        loop {
            used[current] = true;
            let (start, end) = edges[current];
            ring.push(end);
            if end == ring[0] {
                rings.push(simplify_ring(ring));
                break;
            }

            let dir = (end.0 - start.0, end.1 - start.1);
            // Left turn, straight on, right turn (screen coordinates, y down)
            let preferences = [(dir.1, -dir.0), dir, (-dir.1, dir.0)];

            let mut next_edge = None;
            if let Some(candidates) = outgoing.get(&end) {
                'search: for want in preferences {
                    for &i in candidates {
                        if used[i] {
                            continue;
                        }
                        let (s, e) = edges[i];
                        if (e.0 - s.0, e.1 - s.1) == want {
                            next_edge = Some(i);
                            break 'search;
                        }
                    }
                }
            }

            match next_edge {
                Some(i) => current = i,
                // Cannot happen for a well-formed edge set; drop the
                // partial ring rather than loop forever.
                None => break,
            }
        }
    }

    // Orientation separates exteriors (positive shoelace in pixel
    // coordinates) from holes (negative).
    let mut exteriors: Vec<Vec<Corner>> = Vec::new();
    let mut holes: Vec<Vec<Corner>> = Vec::new();
    for ring in rings {
        let area = signed_area(&ring);
        if area > 0.0 {
            exteriors.push(ring);
        } else if area < 0.0 {
            holes.push(ring);
        }
    }

    if exteriors.is_empty() {
        return Vec::new();
    }

    let mut hole_rings: Vec<Vec<LineString<f64>>> = vec![Vec::new(); exteriors.len()];
    for hole in holes {
        let target = if exteriors.len() == 1 {
            0
        } else {
            let sample = hole_sample_point(&hole);
            exteriors
                .iter()
                .position(|ext| ring_contains(ext, sample))
                .unwrap_or(0)
        };
        hole_rings[target].push(ring_to_world(&hole, transform));
    }

    exteriors
        .into_iter()
        .zip(hole_rings)
        .filter_map(|(exterior, interiors)| {
            let polygon = Polygon::new(ring_to_world(&exterior, transform), interiors);
            (polygon.unsigned_area() > 0.0).then_some(polygon)
        })
        .collect()
}

/// Drop collinear corners from a closed ring, wrap-aware
fn simplify_ring(ring: Vec<Corner>) -> Vec<Corner> {
    let mut points = ring;
    points.pop(); // drop the closing duplicate

    let n = points.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let cur = points[i];
        let next = points[(i + 1) % n];
        let d_in = (cur.0 - prev.0, cur.1 - prev.1);
        let d_out = (next.0 - cur.0, next.1 - cur.1);
        if d_in != d_out {
            out.push(cur);
        }
    }

    if let Some(&first) = out.first() {
        out.push(first);
    }
    out
}

/// Shoelace area of a closed ring in pixel-corner coordinates
fn signed_area(ring: &[Corner]) -> f64 {
    let mut sum = 0i64;
    for w in ring.windows(2) {
        sum += w[0].0 * w[1].1 - w[1].0 * w[0].1;
    }
    sum as f64 / 2.0
}

/// A point just inside the foreground next to a hole's first edge
fn hole_sample_point(ring: &[Corner]) -> (f64, f64) {
    let (s, e) = (ring[0], ring[1]);
    let mid = ((s.0 + e.0) as f64 / 2.0, (s.1 + e.1) as f64 / 2.0);
    // Interior lies on the right of the direction of travel
    let dir = ((e.0 - s.0) as f64, (e.1 - s.1) as f64);
    (mid.0 - 0.5 * dir.1, mid.1 + 0.5 * dir.0)
}

/// Even-odd containment test in pixel-corner coordinates
fn ring_contains(ring: &[Corner], point: (f64, f64)) -> bool {
    let (px, py) = point;
    let mut inside = false;

    for w in ring.windows(2) {
        let (x1, y1) = (w[0].0 as f64, w[0].1 as f64);
        let (x2, y2) = (w[1].0 as f64, w[1].1 as f64);
        if (y1 > py) != (y2 > py) {
            let x_cross = x1 + (py - y1) / (y2 - y1) * (x2 - x1);
            if x_cross > px {
                inside = !inside;
            }
        }
    }

    inside
}

fn ring_to_world(ring: &[Corner], transform: &GeoTransform) -> LineString<f64> {
    LineString::new(
        ring.iter()
            .map(|&(x, y)| {
                let (wx, wy) = transform.apply(x as f64, y as f64);
                Coord { x: wx, y: wy }
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{Centroid, Contains, Point};

    fn mask_from(rows: usize, cols: usize, foreground_cells: &[(usize, usize)]) -> Raster<u8> {
        let mut mask: Raster<u8> = Raster::new(rows, cols);
        for &(r, c) in foreground_cells {
            mask.set(r, c, 1).unwrap();
        }
        mask
    }

    #[test]
    fn test_empty_mask_yields_empty_set() {
        let mask = mask_from(8, 8, &[]);
        let polygons = vectorize_mask(&mask, &VectorizeParams::default());
        assert!(polygons.is_empty());
    }

    #[test]
    fn test_single_block_area_and_centroid() {
        // 2x2 foreground block at rows/cols 1..3, 60m pixels
        let mut mask = mask_from(6, 6, &[(1, 1), (1, 2), (2, 1), (2, 2)]);
        mask.set_transform(GeoTransform::new(600_000.0, 4_700_000.0, 60.0, -60.0));

        let polygons = vectorize_mask(&mask, &VectorizeParams::default());
        assert_eq!(polygons.len(), 1);

        let polygon = &polygons[0];
        assert_relative_eq!(polygon.unsigned_area(), 4.0 * 60.0 * 60.0, epsilon = 1e-6);

        let centroid = polygon.centroid().unwrap();
        assert_relative_eq!(centroid.x(), 600_120.0, epsilon = 1e-6);
        assert_relative_eq!(centroid.y(), 4_699_880.0, epsilon = 1e-6);
    }

    #[test]
    fn test_ring_region_keeps_hole() {
        // 3x3 ring of foreground with a background center
        let cells: Vec<(usize, usize)> = (1..4)
            .flat_map(|r| (1..4).map(move |c| (r, c)))
            .filter(|&(r, c)| !(r == 2 && c == 2))
            .collect();
        let mask = mask_from(5, 5, &cells);

        let polygons = vectorize_mask(&mask, &VectorizeParams::default());
        assert_eq!(polygons.len(), 1);

        let polygon = &polygons[0];
        assert_eq!(polygon.interiors().len(), 1);
        assert_relative_eq!(polygon.unsigned_area(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_diagonal_pair_connectivity() {
        let mask = mask_from(4, 4, &[(1, 1), (2, 2)]);

        let four = vectorize_mask(&mask, &VectorizeParams::default());
        assert_eq!(four.len(), 2);
        for polygon in &four {
            assert_relative_eq!(polygon.unsigned_area(), 1.0, epsilon = 1e-9);
        }

        let eight = vectorize_mask(
            &mask,
            &VectorizeParams {
                connectivity: Connectivity::Eight,
                foreground: 1,
            },
        );
        assert_eq!(eight.len(), 1);
        assert_relative_eq!(eight[0].unsigned_area(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_regions_in_scan_order() {
        let mask = mask_from(6, 6, &[(0, 4), (3, 1)]);

        let polygons = vectorize_mask(&mask, &VectorizeParams::default());
        assert_eq!(polygons.len(), 2);

        // Default transform is identity-ish (pixel_height -1), so the
        // first-scanned region sits at x in [4, 5].
        assert!(polygons[0].contains(&Point::new(4.5, -0.5)));
        assert!(polygons[1].contains(&Point::new(1.5, -3.5)));
    }

    #[test]
    fn test_background_value_ignored() {
        let mut mask = mask_from(4, 4, &[(1, 1)]);
        mask.set(2, 2, 7).unwrap(); // not the foreground class

        let polygons = vectorize_mask(&mask, &VectorizeParams::default());
        assert_eq!(polygons.len(), 1);
    }

    #[test]
    fn test_custom_foreground_value() {
        let mut mask: Raster<u8> = Raster::new(4, 4);
        mask.set(1, 1, 7).unwrap();

        let params = VectorizeParams {
            connectivity: Connectivity::Four,
            foreground: 7,
        };
        let polygons = vectorize_mask(&mask, &params);
        assert_eq!(polygons.len(), 1);
    }

    #[test]
    fn test_l_shape_is_one_polygon() {
        let mask = mask_from(5, 5, &[(1, 1), (2, 1), (3, 1), (3, 2), (3, 3)]);

        let polygons = vectorize_mask(&mask, &VectorizeParams::default());
        assert_eq!(polygons.len(), 1);
        assert_relative_eq!(polygons[0].unsigned_area(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_algorithm_wrapper() {
        let mask = mask_from(4, 4, &[(0, 0)]);
        let polygons = Vectorize.execute_default(mask).unwrap();
        assert_eq!(polygons.len(), 1);
    }
}
