//! Assigning labeled points to polygons
//!
//! Two caller-selected policies: containment (first polygon whose area
//! contains the point) and nearest (minimal planar point-to-polygon
//! distance). The mode is never inferred from the data; different scenes
//! legitimately use different modes.

use geo::{Contains, Distance, Euclidean, Point, Polygon};
use lakescan_core::{Error, Result};
use tracing::warn;

/// Matching policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Select the first polygon (in input order) containing the point.
    /// Points inside no polygon stay unmatched; that is a warning, not
    /// an error.
    Containment,
    /// Select the polygon with minimal distance to the point, ties
    /// broken by first occurrence. Requires a non-empty polygon set.
    Nearest,
}

/// One point's assignment: the polygon's index in the input sequence,
/// or `None` when unmatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointMatch {
    pub id: String,
    pub polygon: Option<usize>,
}

/// Result of matching a point set against a polygon set
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    matches: Vec<PointMatch>,
}

impl MatchResult {
    /// All assignments, in input point order
    pub fn matches(&self) -> &[PointMatch] {
        &self.matches
    }

    /// Assignment for one point id
    pub fn get(&self, id: &str) -> Option<&PointMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    /// Number of points that found a polygon
    pub fn matched_count(&self) -> usize {
        self.matches.iter().filter(|m| m.polygon.is_some()).count()
    }

    /// Ids of points that found no polygon
    pub fn unmatched_ids(&self) -> Vec<&str> {
        self.matches
            .iter()
            .filter(|m| m.polygon.is_none())
            .map(|m| m.id.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Match every point to at most one polygon.
///
/// Fails with [`Error::NoPolygonsAvailable`] only in nearest mode with an
/// empty polygon set, where no distance can be computed. In containment
/// mode a miss is recorded as unmatched and processing continues.
pub fn match_points(
    points: &[(String, Point<f64>)],
    polygons: &[Polygon<f64>],
    mode: MatchMode,
) -> Result<MatchResult> {
    if mode == MatchMode::Nearest && polygons.is_empty() {
        return Err(Error::NoPolygonsAvailable);
    }

    let mut result = MatchResult::default();

    for (id, point) in points {
        let polygon = match mode {
            MatchMode::Containment => {
                let hit = polygons.iter().position(|polygon| polygon.contains(point));
                if hit.is_none() {
                    warn!(point = %id, "no polygon contains point, leaving unmatched");
                }
                hit
            }
            MatchMode::Nearest => {
                let mut best = 0;
                let mut best_distance = f64::INFINITY;
                for (i, polygon) in polygons.iter().enumerate() {
                    let distance = Euclidean.distance(point, polygon);
                    if distance < best_distance {
                        best_distance = distance;
                        best = i;
                    }
                }
                Some(best)
            }
        };

        result.matches.push(PointMatch {
            id: id.clone(),
            polygon,
        });
    }

    Ok(result)
}
