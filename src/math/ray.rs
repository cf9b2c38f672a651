//! Ray type and intersection tests

use crate::core::types::{Point, Vec3};
use super::aabb::Aabb;

/// A ray defined by origin and direction.
///
/// The direction does not need to be normalized, and any of its components
/// may be zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get point along ray at parameter t
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Same direction, starting at `origin`
    pub fn from_point(&self, origin: Point) -> Ray {
        Ray { origin, direction: self.direction }
    }

    /// Ray-AABB intersection using the slab method.
    ///
    /// Returns the entry point, or the origin itself when it is already
    /// inside the box. An axis with a zero direction component only
    /// constrains the ray if the origin lies outside the box on that axis.
    pub fn hit_box(&self, aabb: &Aabb) -> Option<Point> {
        if aabb.contains_point(self.origin) {
            return Some(self.origin);
        }

        let mut t_near = 0.0_f32;
        let mut t_far = f32::INFINITY;
        let mut entry_axis = None;

        for axis in 0..3 {
            let o = self.origin[axis];
            let d = self.direction[axis];
            if d == 0.0 {
                if o < aabb.min[axis] || o > aabb.max[axis] {
                    return None;
                }
                continue;
            }

            let t1 = (aabb.min[axis] - o) / d;
            let t2 = (aabb.max[axis] - o) / d;
            let (t_min, t_max) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };

            if t_min > t_near {
                t_near = t_min;
                entry_axis = Some(axis);
            }
            t_far = t_far.min(t_max);
            if t_near > t_far {
                return None;
            }
        }

        let mut entry = self.at(t_near);
        // Snap onto the entry face so the point is exactly on the box
        if let Some(axis) = entry_axis {
            entry[axis] = if self.direction[axis] > 0.0 { aabb.min[axis] } else { aabb.max[axis] };
        }
        Some(entry)
    }

    /// Intersection with the plane through `plane_point` perpendicular to
    /// `axis`.
    ///
    /// Only crossings strictly ahead of the origin count. A ray parallel to
    /// the plane never crosses it.
    pub fn hit_plane(&self, plane_point: Point, axis: usize) -> Option<Point> {
        debug_assert!(axis < 3);
        let d = self.direction[axis];
        if d == 0.0 {
            return None;
        }

        let t = (plane_point[axis] - self.origin[axis]) / d;
        if t <= 0.0 {
            return None;
        }

        let mut hit = self.at(t);
        hit[axis] = plane_point[axis];
        Some(hit)
    }
}
