//! Pure overlap predicates shared by every mover.
//!
//! Everything here works on the horizontal X/Z plane unless stated otherwise; the Y axis of
//! a [`Vec3`] is ignored because every mover shares one height band.

use glam::{Vec2, Vec3};

/// Projects a world position onto the horizontal plane.
#[inline]
pub fn xz(position: Vec3) -> Vec2 {
    Vec2::new(position.x, position.z)
}

/// An axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Builds a box from its center and half extents.
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Grows the box by `radius` on X and Z, leaving Y untouched.
    pub fn inflated_xz(&self, radius: f32) -> Self {
        let grow = Vec3::new(radius, 0.0, radius);
        Self {
            min: self.min - grow,
            max: self.max + grow,
        }
    }

    /// Strict containment of a point's X/Z footprint; touching an edge does not count.
    pub fn contains_xz(&self, point: Vec3) -> bool {
        point.x > self.min.x && point.x < self.max.x && point.z > self.min.z && point.z < self.max.z
    }
}

/// Returns `true` when a circle on the X/Z plane overlaps a box, using the closest point of the
/// box to the circle's center.
pub fn circle_overlaps_box(center: Vec3, radius: f32, aabb: &Aabb) -> bool {
    let point = xz(center);
    let closest = point.clamp(xz(aabb.min), xz(aabb.max));
    point.distance(closest) < radius
}

/// Returns `true` when two circles on the X/Z plane overlap.
pub fn circles_overlap(a: Vec3, radius_a: f32, b: Vec3, radius_b: f32) -> bool {
    xz(a).distance(xz(b)) < radius_a + radius_b
}
