use glam::{BVec3, UVec3, Vec3};

/// Spacing between 1.0 and the next representable single precision value.
pub const ULP: f32 = f32::EPSILON;

/// Smallest extent that is never treated as degenerate, regardless of coordinate magnitude.
pub const MINIMUM_EXTENT: f32 = 1e-19;

/// Flags the axes along which `upper - lower` is too small to subdivide reliably.
///
/// The tolerance grows with the magnitude of the coordinates so that boxes far from the
/// origin, where only a handful of representable values separate the bounds, are also caught.
#[inline(always)]
pub fn ulp_sized(lower: Vec3, upper: Vec3) -> BVec3 {
    let magnitude = lower.abs().max(upper.abs());
    let tolerance = (magnitude * (128.0 * ULP)).max(Vec3::splat(MINIMUM_EXTENT));
    (upper - lower).cmple(tolerance)
}

/// Number of leaf blocks of `1 << blocks_shift` primitives needed to hold each lane's count.
#[inline(always)]
pub fn block_count(count: UVec3, blocks_shift: u32) -> UVec3 {
    debug_assert!(blocks_shift < 32, "Block shift must fit in a 32 bit count.");
    let blocks_add = (1u32 << blocks_shift) - 1;
    (count + UVec3::splat(blocks_add)) >> blocks_shift
}

/// Scalar version of [`block_count`].
#[inline(always)]
pub fn block_count_scalar(count: usize, blocks_shift: u32) -> usize {
    debug_assert!(blocks_shift < usize::BITS, "Block shift must fit in a count.");
    let blocks_add = (1usize << blocks_shift) - 1;
    (count + blocks_add) >> blocks_shift
}
