//! Coordinate reference system identifiers
//!
//! lakescan only tags data with a CRS and checks that two datasets agree;
//! reprojection is an external collaborator's job.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A coordinate reference system identifier.
///
/// Carried alongside rasters and geometry collections so that stages can
/// refuse to combine data from different reference systems. No coordinate
/// math is performed on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crs {
    /// EPSG code, e.g. `Epsg(32633)` for UTM zone 33N
    Epsg(u32),
    /// Well-known-text definition
    Wkt(String),
    /// PROJ definition string
    Proj(String),
}

impl Crs {
    /// WGS84 geographic coordinates (EPSG:4326)
    pub fn wgs84() -> Self {
        Crs::Epsg(4326)
    }

    /// EPSG code, if this identifier carries one
    pub fn epsg(&self) -> Option<u32> {
        match self {
            Crs::Epsg(code) => Some(*code),
            _ => None,
        }
    }

    /// Whether two identifiers refer to the same system.
    ///
    /// Identifiers of different kinds (EPSG vs WKT) are never considered
    /// equivalent, even when they describe the same datum; callers needing
    /// that level of comparison should normalize to EPSG codes first.
    pub fn is_equivalent(&self, other: &Crs) -> bool {
        self == other
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "EPSG:{}", code),
            Crs::Proj(s) => write!(f, "{}", s),
            Crs::Wkt(s) => write!(f, "WKT:{}", &s[..s.len().min(50)]),
        }
    }
}

impl Default for Crs {
    fn default() -> Self {
        Crs::wgs84()
    }
}
