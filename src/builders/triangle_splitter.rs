use crate::geometry::prim_ref::PrimRef;
use crate::utilities::bounding_box::BoundingBox;
use glam::Vec3;

/// Clips a triangle against the axis-aligned plane `p[dim] == pos`.
///
/// Returns the references for the part with `p[dim] <= pos` and the part with `p[dim] >= pos`.
/// Vertices on the plane extend both sides, as do edge crossings. A side that only touches the
/// plane has no area and comes back empty, unless the whole triangle lies in the plane.
/// Both results are intersected with `prim.bounds`, so clipping an already clipped reference
/// never grows it; either result may be empty.
pub fn split_triangle(prim: &PrimRef, dim: usize, pos: f32, vertices: &[Vec3; 3]) -> (PrimRef, PrimRef) {
    debug_assert!(dim < 3);
    let mut left = BoundingBox::EMPTY;
    let mut right = BoundingBox::EMPTY;
    let mut left_beyond = false;
    let mut right_beyond = false;

    // Walk the edges (v2, v0), (v0, v1), (v1, v2).
    let mut v1 = vertices[2];
    for &vertex in vertices {
        let v0 = v1;
        v1 = vertex;
        let v0d = v0[dim];
        let v1d = v1[dim];
        if v0d <= pos {
            left.extend_point(v0);
            left_beyond |= v0d < pos;
        }
        if v0d >= pos {
            right.extend_point(v0);
            right_beyond |= v0d > pos;
        }
        if (v0d < pos && pos < v1d) || (v1d < pos && pos < v0d) {
            debug_assert!(v1d - v0d != 0.0);
            let mut crossing = v0 + (pos - v0d) / (v1d - v0d) * (v1 - v0);
            crossing[dim] = pos;
            left.extend_point(crossing);
            right.extend_point(crossing);
        }
    }

    if !left_beyond && right_beyond {
        left = BoundingBox::EMPTY;
    }
    if !right_beyond && left_beyond {
        right = BoundingBox::EMPTY;
    }

    (
        PrimRef::new(BoundingBox::intersect(&left, &prim.bounds), prim.geom_id, prim.prim_id),
        PrimRef::new(BoundingBox::intersect(&right, &prim.bounds), prim.geom_id, prim.prim_id),
    )
}
