use crate::utilities::bounding_box::BoundingBox;
use glam::Vec3;

/// Reference to one triangle of one mesh, together with the box it currently occupies.
///
/// Spatial splits clip references, so `bounds` may be tighter than the triangle's own box.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrimRef {
    /// Box of the (possibly clipped) primitive.
    pub bounds: BoundingBox,
    /// Index of the owning mesh in the scene.
    pub geom_id: u32,
    /// Index of the triangle within its mesh.
    pub prim_id: u32,
}

impl PrimRef {
    #[inline(always)]
    pub fn new(bounds: BoundingBox, geom_id: u32, prim_id: u32) -> Self {
        Self {
            bounds,
            geom_id,
            prim_id,
        }
    }

    /// Twice the center of the reference's box. Avoids a multiply when only ordering matters.
    #[inline(always)]
    pub fn center2(&self) -> Vec3 {
        self.bounds.min + self.bounds.max
    }

    /// Whether clipping left nothing of this reference.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}
