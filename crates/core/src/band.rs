//! Spectral bands and band stacks
//!
//! A scene arrives as one file per spectral band. `BandCode` names the
//! band from a closed vocabulary, `Band` couples a code with its pixel
//! grid, and `BandStack` holds a scene's bands with a uniform shape
//! enforced at construction.

use crate::error::{Error, Result};
use crate::raster::{Raster, RasterProfile};
use std::fmt;

/// Spectral band codes of a multi-spectral scene (Sentinel-2 vocabulary).
///
/// Codes are parsed from a known vocabulary, never derived from string
/// offsets into a filename. Derived ordering is the lexicographic order
/// of the two-character codes ("01" < ... < "12" < "8A").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BandCode {
    B01,
    B02,
    B03,
    B04,
    B05,
    B06,
    B07,
    B08,
    B09,
    B10,
    B11,
    B12,
    B8A,
}

impl BandCode {
    /// Every code in the vocabulary, in canonical order
    pub const ALL: [BandCode; 13] = [
        BandCode::B01,
        BandCode::B02,
        BandCode::B03,
        BandCode::B04,
        BandCode::B05,
        BandCode::B06,
        BandCode::B07,
        BandCode::B08,
        BandCode::B09,
        BandCode::B10,
        BandCode::B11,
        BandCode::B12,
        BandCode::B8A,
    ];

    /// Two-character code as it appears in band names ("04", "8A", ...)
    pub fn code(&self) -> &'static str {
        match self {
            BandCode::B01 => "01",
            BandCode::B02 => "02",
            BandCode::B03 => "03",
            BandCode::B04 => "04",
            BandCode::B05 => "05",
            BandCode::B06 => "06",
            BandCode::B07 => "07",
            BandCode::B08 => "08",
            BandCode::B09 => "09",
            BandCode::B10 => "10",
            BandCode::B11 => "11",
            BandCode::B12 => "12",
            BandCode::B8A => "8A",
        }
    }

    /// Parse a bare two-character code
    pub fn parse(code: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.code() == code)
            .ok_or_else(|| Error::UnknownBandCode(code.to_string()))
    }

    /// Derive a band code from a file stem.
    ///
    /// Scans the stem for a `B<code>` token (e.g. `T33PTM_20241126_B8A`),
    /// matching against the vocabulary rather than slicing at a fixed
    /// offset. The longest code wins at each position so `B8A` is not
    /// misread as `B08`'s neighbor.
    pub fn from_stem(stem: &str) -> Result<Self> {
        let bytes = stem.as_bytes();
        for (i, &b) in bytes.iter().enumerate() {
            if b != b'B' || i + 3 > bytes.len() {
                continue;
            }
            let Ok(candidate) = std::str::from_utf8(&bytes[i + 1..i + 3]) else {
                continue;
            };
            if let Ok(code) = Self::parse(candidate) {
                return Ok(code);
            }
        }
        Err(Error::UnknownBandCode(stem.to_string()))
    }
}

impl fmt::Display for BandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.code())
    }
}

/// One spectral band: a pixel grid plus its code
#[derive(Debug, Clone)]
pub struct Band {
    code: BandCode,
    grid: Raster<f64>,
}

impl Band {
    pub fn new(code: BandCode, grid: Raster<f64>) -> Self {
        Self { code, grid }
    }

    pub fn code(&self) -> BandCode {
        self.code
    }

    pub fn grid(&self) -> &Raster<f64> {
        &self.grid
    }

    pub fn into_grid(self) -> Raster<f64> {
        self.grid
    }

    /// Typed profile of this band (single-band, float32 storage)
    pub fn profile(&self) -> Result<RasterProfile> {
        let profile = RasterProfile::of(&self.grid)?;
        Ok(profile.with_storage(crate::raster::DataType::Float32, profile.nodata()))
    }
}

/// An ordered collection of bands sharing one grid shape.
///
/// The shape invariant is checked at construction; the first band's
/// geometry serves as the stack's reference profile. Band order is
/// whatever the caller supplies (loaders sort their inputs first), so
/// iteration is deterministic.
#[derive(Debug, Clone)]
pub struct BandStack {
    bands: Vec<Band>,
}

impl BandStack {
    /// Build a stack, enforcing the uniform-shape invariant.
    pub fn new(bands: Vec<Band>) -> Result<Self> {
        let first = bands.first().ok_or(Error::NoBandsFound)?;
        let (rows, cols) = first.grid().shape();

        for band in &bands {
            let (r, c) = band.grid().shape();
            if (r, c) != (rows, cols) {
                return Err(Error::InconsistentShape {
                    band: band.code().to_string(),
                    rows: r,
                    cols: c,
                    expected_rows: rows,
                    expected_cols: cols,
                });
            }
        }

        Ok(Self { bands })
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Shape shared by every band as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.bands[0].grid().shape()
    }

    /// Codes in stack order
    pub fn codes(&self) -> Vec<BandCode> {
        self.bands.iter().map(|b| b.code()).collect()
    }

    /// Look up a band by code
    pub fn band(&self, code: BandCode) -> Option<&Band> {
        self.bands.iter().find(|b| b.code() == code)
    }

    pub fn contains(&self, code: BandCode) -> bool {
        self.band(code).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Band> {
        self.bands.iter()
    }

    /// Reference profile: the first band's geometry and storage
    pub fn profile(&self) -> Result<RasterProfile> {
        self.bands[0].profile()
    }
}
