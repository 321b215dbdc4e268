use crate::geometry::prim_ref::PrimRef;
use crate::utilities::bounding_box::BoundingBox;
use crate::utilities::math_helper;

/// Summary of a contiguous range of primitive references.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrimInfo {
    /// First reference of the range.
    pub begin: usize,
    /// One past the last reference of the range.
    pub end: usize,
    /// Union of the references' boxes.
    pub geom_bounds: BoundingBox,
    /// Bounds of the references' doubled centers. See [`PrimRef::center2`].
    pub cent_bounds: BoundingBox,
}

impl Default for PrimInfo {
    fn default() -> Self {
        Self::empty()
    }
}

impl PrimInfo {
    /// An empty range starting at zero.
    #[inline]
    pub fn empty() -> Self {
        Self {
            begin: 0,
            end: 0,
            geom_bounds: BoundingBox::EMPTY,
            cent_bounds: BoundingBox::EMPTY,
        }
    }

    #[inline]
    pub fn new(begin: usize, end: usize, geom_bounds: BoundingBox, cent_bounds: BoundingBox) -> Self {
        debug_assert!(begin <= end);
        Self {
            begin,
            end,
            geom_bounds,
            cent_bounds,
        }
    }

    /// Computes the summary of a slice of references, treated as the range `0..prims.len()`.
    pub fn from_prims(prims: &[PrimRef]) -> Self {
        let mut info = Self::empty();
        for prim in prims {
            info.add(&prim.bounds);
        }
        info
    }

    /// Appends one reference's box to the end of the range.
    #[inline(always)]
    pub fn add(&mut self, bounds: &BoundingBox) {
        self.geom_bounds.extend(bounds);
        self.cent_bounds.extend_point(bounds.min + bounds.max);
        self.end += 1;
    }

    /// Combines two summaries. The result spans both ranges' references.
    pub fn merge(&mut self, other: &PrimInfo) {
        let count = self.size() + other.size();
        self.begin = self.begin.min(other.begin);
        self.end = self.begin + count;
        self.geom_bounds.extend(&other.geom_bounds);
        self.cent_bounds.extend(&other.cent_bounds);
    }

    /// Number of references in the range.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.end - self.begin
    }

    /// SAH cost of storing the whole range in one leaf made of `1 << blocks_shift` sized blocks.
    #[inline]
    pub fn leaf_sah(&self, blocks_shift: u32) -> f32 {
        self.geom_bounds.half_area() * math_helper::block_count_scalar(self.size(), blocks_shift) as f32
    }
}
