use crate::geometry::prim_info::PrimInfo;
use crate::utilities::bounding_box::BoundingBox;
use crate::utilities::math_helper;
use glam::{IVec3, UVec3, Vec3};
use log::debug;

/// Shrinks the mapped range slightly so that the upper bound of the range never rounds into bin `BINS`.
const RANGE_SHRINK: f32 = 0.99;

/// Linear mapping from world coordinates to spatial bin indices, per axis.
///
/// A zero scale marks an axis too thin to subdivide; everything on it maps to bin 0 and the
/// split search skips it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialBinMapping<const BINS: usize> {
    ofs: Vec3,
    scale: Vec3,
}

/// All axes degenerate. Only meaningful as the mapping of an invalid split.
impl<const BINS: usize> Default for SpatialBinMapping<BINS> {
    fn default() -> Self {
        Self {
            ofs: Vec3::ZERO,
            scale: Vec3::ZERO,
        }
    }
}

impl<const BINS: usize> SpatialBinMapping<BINS> {
    pub(crate) const BIN_COUNT_CHECK: () = assert!(BINS >= 2, "Spatial binning needs at least two bins.");

    /// Calculates the mapping for a primitive range from its geometry bounds.
    #[inline]
    pub fn new(pinfo: &PrimInfo) -> Self {
        Self::from_bounds(&pinfo.geom_bounds)
    }

    /// Calculates the mapping spanning the given bounds.
    pub fn from_bounds(bounds: &BoundingBox) -> Self {
        let () = Self::BIN_COUNT_CHECK;
        debug_assert!(!bounds.is_empty(), "Cannot bin an empty range.");
        let ulp_sized = math_helper::ulp_sized(bounds.min, bounds.max);
        let scale = Vec3::select(
            ulp_sized,
            Vec3::ZERO,
            Vec3::splat(BINS as f32 * RANGE_SHRINK) / bounds.size(),
        );
        if ulp_sized.any() {
            debug!(
                "spatial bin mapping over {} has degenerate axes {:?}",
                bounds, ulp_sized
            );
        }
        Self {
            ofs: bounds.min,
            scale,
        }
    }

    /// World coordinate of bin 0's lower edge on each axis.
    #[inline(always)]
    pub fn offset(&self) -> Vec3 {
        self.ofs
    }

    /// Bins per world unit on each axis, zero for degenerate axes.
    #[inline(always)]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Slower but safe binning: the result is always clamped into `0..BINS`.
    ///
    /// Only suitable for classifying the start and end bin of a box; clip planes come from [`Self::pos`].
    #[inline(always)]
    pub fn bin(&self, p: Vec3) -> UVec3 {
        let i = ((p - self.ofs) * self.scale).floor().as_ivec3();
        i.clamp(IVec3::ZERO, IVec3::splat(BINS as i32 - 1)).as_uvec3()
    }

    /// World coordinate of the left edge of `bin` along `dim`.
    #[inline(always)]
    pub fn pos(&self, bin: usize, dim: usize) -> f32 {
        debug_assert!(!self.invalid(dim), "Degenerate axes have no bin boundaries.");
        bin as f32 / self.scale[dim] + self.ofs[dim]
    }

    /// Returns true if the mapping is degenerate along `dim`.
    #[inline(always)]
    pub fn invalid(&self, dim: usize) -> bool {
        self.scale[dim] == 0.0
    }
}
