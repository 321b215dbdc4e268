use glam::Vec3;
use std::fmt;

/// Provides simple axis-aligned bounding box functionality.
///
/// An empty box has `min > max` on at least one axis. The canonical empty value is
/// [`BoundingBox::EMPTY`], which every operation producing an empty box returns so that
/// extending with it is always a no-op.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Location with the lowest X, Y, and Z coordinates in the axis-aligned bounding box.
    pub min: Vec3,
    /// Location with the highest X, Y, and Z coordinates in the axis-aligned bounding box.
    pub max: Vec3,
}

impl Default for BoundingBox {
    #[inline(always)]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoundingBox {
    /// Box containing nothing. Extending it with a point or box yields that point or box.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Constructs a bounding box from the specified minimum and maximum.
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Constructs a zero-sized bounding box around a single point.
    #[inline]
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Creates the smallest possible bounding box that contains a list of points.
    /// Returns [`BoundingBox::EMPTY`] for an empty list.
    pub fn from_points(points: &[Vec3]) -> Self {
        points.iter().fold(Self::EMPTY, |mut bounds, point| {
            bounds.extend_point(*point);
            bounds
        })
    }

    /// Whether the box contains no points at all.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Grows the box to contain the given point.
    #[inline(always)]
    pub fn extend_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Grows the box to contain another box.
    #[inline(always)]
    pub fn extend(&mut self, other: &BoundingBox) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Computes a bounding box which contains two other bounding boxes.
    #[inline]
    pub fn create_merged(min_a: Vec3, max_a: Vec3, min_b: Vec3, max_b: Vec3) -> (Vec3, Vec3) {
        (min_a.min(min_b), max_a.max(max_b))
    }

    /// Computes a bounding box which contains two other bounding boxes.
    #[inline]
    pub fn create_merged_boxes(a: &Self, b: &Self) -> Self {
        let (min, max) = Self::create_merged(a.min, a.max, b.min, b.max);
        Self { min, max }
    }

    /// Computes the region shared by both boxes, or [`BoundingBox::EMPTY`] if they are disjoint.
    #[inline]
    pub fn intersect(a: &Self, b: &Self) -> Self {
        let result = Self {
            min: a.min.max(b.min),
            max: a.max.min(b.max),
        };
        if result.is_empty() {
            Self::EMPTY
        } else {
            result
        }
    }

    /// Extent of the box along each axis.
    #[inline(always)]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Half of the surface area of the box. Empty boxes have zero area.
    #[inline(always)]
    pub fn half_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.size();
        d.x * (d.y + d.z) + d.y * d.z
    }

    /// Whether `other` lies completely inside this box. Empty boxes are contained by anything.
    #[inline]
    pub fn encloses(&self, other: &BoundingBox) -> bool {
        other.is_empty() || (self.min.cmple(other.min).all() && self.max.cmpge(other.max).all())
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "(empty)")
        } else {
            write!(f, "({}, {})", self.min, self.max)
        }
    }
}
