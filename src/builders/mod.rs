pub mod parallel_binning;
pub mod settings;
pub mod spatial_bin_info;
pub mod spatial_bin_mapping;
pub mod spatial_bin_split;
pub mod triangle_splitter;

pub use self::parallel_binning::{bin_parallel, find_spatial_split};
pub use self::settings::SpatialBinningSettings;
pub use self::spatial_bin_info::SpatialBinInfo;
pub use self::spatial_bin_mapping::SpatialBinMapping;
pub use self::spatial_bin_split::{Axis, SpatialBinSplit};
pub use self::triangle_splitter::split_triangle;
