//! # lakescan pipeline
//!
//! The raster-to-geometry extraction stages:
//!
//! - **resample**: rescale a band to a target ground resolution
//! - **crop**: clip a band to a set of polygons
//! - **stack**: load band files into a [`lakescan_core::BandStack`]
//! - **indices**: NDVI / NDWI normalized-difference maps
//! - **threshold**: binary feature masks from index maps
//! - **vectorize**: trace mask regions into polygons
//! - **matching**: assign labeled points to polygons
//!
//! Data flows strictly forward; every stage consumes immutable inputs
//! and returns new values, so stages can be run concurrently over
//! independent bands or scenes.

mod maybe_rayon;

pub mod crop;
pub mod indices;
pub mod matching;
pub mod resample;
pub mod stack;
pub mod threshold;
pub mod vectorize;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crop::crop_to_polygons;
    pub use crate::indices::{compute_index, IndexKind, IndexMap, INDEX_NODATA};
    pub use crate::matching::{match_points, MatchMode, MatchResult, PointMatch};
    pub use crate::resample::{resample_res, Resample, ResampleParams, ResamplingKernel};
    pub use crate::stack::{load_band_stack, StackParams};
    pub use crate::threshold::{threshold_mask, Polarity};
    pub use crate::vectorize::{vectorize_mask, Connectivity, Vectorize, VectorizeParams};
    pub use lakescan_core::prelude::*;
}
