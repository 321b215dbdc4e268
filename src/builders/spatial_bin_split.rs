use crate::builders::spatial_bin_mapping::SpatialBinMapping;
use crate::builders::triangle_splitter::split_triangle;
use crate::geometry::prim_ref::PrimRef;
use crate::geometry::triangle_mesh::TriangleSource;
use std::fmt;

/// One of the three spatial axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All axes in the order the split search visits them.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline(always)]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Stores all information required to perform a spatial split.
///
/// The default value is the invalid split: infinite cost and no axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialBinSplit<const BINS: usize> {
    /// SAH cost of the split.
    pub sah: f32,
    /// Split axis, `None` for an invalid split.
    pub dim: Option<Axis>,
    /// Split boundary; the plane sits between bin `pos - 1` and bin `pos`.
    pub pos: usize,
    /// Mapping the bins were built with, needed to recover the plane's world coordinate.
    pub mapping: SpatialBinMapping<BINS>,
}

impl<const BINS: usize> Default for SpatialBinSplit<BINS> {
    fn default() -> Self {
        Self {
            sah: f32::INFINITY,
            dim: None,
            pos: 0,
            mapping: SpatialBinMapping::default(),
        }
    }
}

impl<const BINS: usize> SpatialBinSplit<BINS> {
    /// Constructs the specified split.
    #[inline]
    pub fn new(sah: f32, dim: Axis, pos: usize, mapping: SpatialBinMapping<BINS>) -> Self {
        debug_assert!(sah.is_finite(), "Valid splits must have a finite cost.");
        debug_assert!(pos > 0 && pos < BINS, "Split boundaries lie strictly between bins.");
        Self {
            sah,
            dim: Some(dim),
            pos,
            mapping,
        }
    }

    /// Tests if this split is valid.
    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        self.dim.is_some()
    }

    /// Surface area heuristic cost of performing the split.
    #[inline(always)]
    pub fn split_sah(&self) -> f32 {
        self.sah
    }

    /// World coordinate of the split plane along the split axis.
    #[inline]
    pub fn split_position(&self) -> Option<f32> {
        self.dim.map(|dim| self.mapping.pos(self.pos, dim.index()))
    }

    /// Clips a reference at the split plane, producing its left and right parts.
    ///
    /// Either part may be empty when the reference lies on one side of the plane.
    pub fn split_primitive<S: TriangleSource + ?Sized>(
        &self,
        prim: &PrimRef,
        source: &S,
    ) -> Option<(PrimRef, PrimRef)> {
        let dim = self.dim?;
        let pos = self.mapping.pos(self.pos, dim.index());
        let vertices = source.triangle_vertices(prim.geom_id, prim.prim_id);
        Some(split_triangle(prim, dim.index(), pos, &vertices))
    }
}

impl<const BINS: usize> fmt::Display for SpatialBinSplit<BINS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dim {
            Some(dim) => write!(
                f,
                "SpatialBinSplit {{ sah = {}, dim = {}, pos = {} }}",
                self.sah,
                dim.index(),
                self.pos
            ),
            None => write!(f, "SpatialBinSplit {{ sah = {}, dim = -1, pos = {} }}", self.sah, self.pos),
        }
    }
}
