//! Axis-aligned bounding box

use crate::core::types::{Point, Vec3};

/// Axis-aligned bounding box defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box occupied by the voxel whose minimum corner is `voxel`
    pub fn from_voxel(voxel: Point, voxel_size: Vec3) -> Self {
        Self {
            min: voxel,
            max: voxel + voxel_size,
        }
    }

    /// Per-voxel-extended bounding box of a voxel set.
    ///
    /// The max corner is the largest voxel corner plus one voxel size.
    /// Returns `None` for an empty set.
    pub fn from_voxels(voxels: &[Point], voxel_size: Vec3) -> Option<Self> {
        let (first, rest) = voxels.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self::new(min, max + voxel_size))
    }

    /// Get center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Check if point is inside AABB (faces included)
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y &&
        p.z >= self.min.z && p.z <= self.max.z
    }

    /// Check if point is strictly inside AABB (faces excluded)
    pub fn strictly_contains_point(&self, p: Vec3) -> bool {
        p.x > self.min.x && p.x < self.max.x &&
        p.y > self.min.y && p.y < self.max.y &&
        p.z > self.min.z && p.z < self.max.z
    }

    /// Check if a voxel (given by its minimum corner) lies in the box.
    ///
    /// Uses the half-open range `[min, max)` so that a voxel sitting right
    /// at the max face is outside.
    pub fn contains_voxel(&self, voxel: Point) -> bool {
        voxel.cmpge(self.min).all() && voxel.cmplt(self.max).all()
    }

    /// Check if `other` lies entirely within this box
    pub fn contains_box(&self, other: &Aabb) -> bool {
        other.min.cmpge(self.min).all() && other.max.cmple(self.max).all()
    }

    /// Check if the box and a solid ball overlap
    pub fn intersects_ball(&self, center: Point, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }

    /// Expand AABB to include a voxel given by its minimum corner
    pub fn expand_voxel(&mut self, voxel: Point, voxel_size: Vec3) {
        self.min = self.min.min(voxel);
        self.max = self.max.max(voxel + voxel_size);
    }

    /// Vertex of the box closest to `p`, chosen independently on each axis
    pub fn closest_vertex(&self, p: Point) -> Point {
        let pick = |p: f32, min: f32, max: f32| {
            if (p - min).abs() <= (p - max).abs() { min } else { max }
        };
        Vec3::new(
            pick(p.x, self.min.x, self.max.x),
            pick(p.y, self.min.y, self.max.y),
            pick(p.z, self.min.z, self.max.z),
        )
    }

    /// Part of the box lying in subspace `index` around `center`.
    ///
    /// Bit `k` of `index` selects the upper half (`>= center[k]`) on axis
    /// `k`. Returns `None` when that part has no volume.
    pub fn divide(&self, center: Point, index: usize) -> Option<Aabb> {
        debug_assert!(index < 8);
        let mut min = self.min;
        let mut max = self.max;
        for axis in 0..3 {
            if index & (1 << axis) != 0 {
                min[axis] = min[axis].max(center[axis]);
            } else {
                max[axis] = max[axis].min(center[axis]);
            }
            if min[axis] >= max[axis] {
                return None;
            }
        }
        Some(Aabb { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_accessors() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.center(), Vec3::splat(0.5));
        assert_eq!(aabb.size(), Vec3::ONE);
    }

    #[test]
    fn test_from_voxels() {
        let voxels = [Vec3::new(0.0, 2.0, 1.0), Vec3::new(3.0, 0.0, 1.0)];
        let aabb = Aabb::from_voxels(&voxels, Vec3::ONE).unwrap();
        assert_eq!(aabb.min, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.max, Vec3::new(4.0, 3.0, 2.0));
        assert!(Aabb::from_voxels(&[], Vec3::ONE).is_none());
    }

    #[test]
    fn test_contains_point() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(aabb.contains_point(Vec3::splat(0.5)));
        assert!(aabb.contains_point(Vec3::ONE));
        assert!(!aabb.contains_point(Vec3::splat(2.0)));
        assert!(!aabb.strictly_contains_point(Vec3::ONE));
        assert!(aabb.strictly_contains_point(Vec3::splat(0.5)));
    }

    #[test]
    fn test_contains_voxel_half_open() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        assert!(aabb.contains_voxel(Vec3::ZERO));
        assert!(aabb.contains_voxel(Vec3::ONE));
        assert!(!aabb.contains_voxel(Vec3::new(2.0, 0.0, 0.0)));
        assert!(!aabb.contains_voxel(Vec3::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_intersects_ball() {
        let aabb = Aabb::new(Vec3::splat(10.0), Vec3::splat(11.0));
        assert!(aabb.intersects_ball(Vec3::splat(10.0), 0.1));
        assert!(aabb.intersects_ball(Vec3::new(9.0, 10.5, 10.5), 1.0));
        assert!(!aabb.intersects_ball(Vec3::new(8.9, 10.5, 10.5), 1.0));
        assert!(!aabb.intersects_ball(Vec3::ZERO, 1.0));
    }

    #[test]
    fn test_expand_voxel() {
        let mut aabb = Aabb::from_voxel(Vec3::ZERO, Vec3::ONE);
        aabb.expand_voxel(Vec3::new(-2.0, 3.0, 0.0), Vec3::ONE);
        assert_eq!(aabb.min, Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 1.0));
    }

    #[test]
    fn test_closest_vertex() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(4.0));
        let v = aabb.closest_vertex(Vec3::new(5.0, 1.0, -3.0));
        assert_eq!(v, Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_divide() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(4.0));
        let center = Vec3::new(1.0, 2.0, 3.0);

        let low = aabb.divide(center, 0).unwrap();
        assert_eq!(low, Aabb::new(Vec3::ZERO, center));

        let high = aabb.divide(center, 7).unwrap();
        assert_eq!(high, Aabb::new(center, Vec3::splat(4.0)));

        // Center on the min face leaves nothing below it
        let flat = Aabb::new(Vec3::ZERO, Vec3::splat(4.0));
        assert!(flat.divide(Vec3::new(0.0, 2.0, 2.0), 0).is_none());
    }
}
