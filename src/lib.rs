//! Spatial split binning for SAH bounding volume hierarchy builders.
//!
//! A builder computes a [`SpatialBinMapping`] from a primitive range's bounds, bins the
//! range's triangle references into one or more [`SpatialBinInfo`]s (clipping every triangle
//! against the bin boundaries it straddles), merges the partial bins and asks for the
//! cheapest [`SpatialBinSplit`]. The split's mapping recovers the exact clip plane for
//! partitioning the references afterwards.

pub mod builders;
mod error;
pub mod geometry;
pub mod utilities;

pub use builders::{
    bin_parallel, find_spatial_split, split_triangle, Axis, SpatialBinInfo, SpatialBinMapping,
    SpatialBinSplit, SpatialBinningSettings,
};
pub use error::SpatialSplitError;
pub use geometry::{PrimInfo, PrimRef, Scene, TriangleMesh, TriangleSource};
pub use utilities::bounding_box::BoundingBox;
