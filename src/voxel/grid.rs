//! The voxel grid every tree is built on

use crate::core::types::{Point, UVec3, Vec3};
use crate::math::Aabb;

/// Slack in ULPs when snapping coordinates to grid lines, so that an
/// already aligned coordinate survives float division unchanged.
const SNAP_ULPS: f32 = 4.0;

/// A fixed global grid of equally sized voxels.
///
/// A voxel is identified by its minimum corner, which is always a multiple
/// of the voxel size. Every tree owns its grid; the size must be chosen
/// before the tree is built and cannot change afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelGrid {
    size: Vec3,
}

impl Default for VoxelGrid {
    fn default() -> Self {
        Self { size: Vec3::ONE }
    }
}

impl VoxelGrid {
    /// Create a grid with the given voxel size.
    ///
    /// Panics if any component is not a positive finite number.
    pub fn new(size: Vec3) -> Self {
        assert!(
            size.is_finite() && size.cmpgt(Vec3::ZERO).all(),
            "voxel size must be positive and finite, got {size}"
        );
        Self { size }
    }

    /// Size of one voxel
    pub fn size(&self) -> Vec3 {
        self.size
    }

    /// Volume of one voxel
    pub fn voxel_volume(&self) -> f32 {
        self.size.x * self.size.y * self.size.z
    }

    /// Minimum corner of the voxel containing `p`
    pub fn align_floor(&self, p: Point) -> Point {
        snap(p / self.size, f32::floor) * self.size
    }

    /// Smallest grid point not below `p` on any axis
    pub fn align_ceil(&self, p: Point) -> Point {
        snap(p / self.size, f32::ceil) * self.size
    }

    /// Align every point to the grid and drop duplicates.
    ///
    /// This is the preprocessing bulk construction expects from its caller.
    pub fn align_voxels(&self, mut points: Vec<Point>) -> Vec<Point> {
        for p in points.iter_mut() {
            *p = self.align_floor(*p);
        }
        points.sort_unstable_by(|a, b| {
            a.x.total_cmp(&b.x)
                .then(a.y.total_cmp(&b.y))
                .then(a.z.total_cmp(&b.z))
        });
        points.dedup();
        points
    }

    /// Box occupied by a single voxel
    pub fn voxel_box(&self, voxel: Point) -> Aabb {
        Aabb::from_voxel(voxel, self.size)
    }

    /// Number of voxels along each axis of a grid-aligned box
    pub fn dimensions(&self, aabb: &Aabb) -> UVec3 {
        let dim = (aabb.size() / self.size).round().max(Vec3::ZERO);
        UVec3::new(dim.x as u32, dim.y as u32, dim.z as u32)
    }

    /// Number of voxels a grid-aligned box can hold
    pub fn capacity(&self, aabb: &Aabb) -> u64 {
        let dim = self.dimensions(aabb);
        dim.x as u64 * dim.y as u64 * dim.z as u64
    }

    /// True if `n` distinct voxels inside `aabb` fill it without gaps
    pub fn is_dense(&self, aabb: &Aabb, n: usize) -> bool {
        self.capacity(aabb) == n as u64
    }

    /// Every voxel of a grid-aligned box, x outermost and z innermost.
    ///
    /// Coordinates are re-aligned cell by cell instead of accumulated, so
    /// they compare equal to the same voxels aligned from user input.
    pub fn voxels_in(&self, aabb: &Aabb) -> impl Iterator<Item = Point> + use<> {
        let grid = *self;
        let dim = self.dimensions(aabb);
        let min = aabb.min;
        (0..dim.x).flat_map(move |i| {
            (0..dim.y).flat_map(move |j| {
                (0..dim.z).map(move |k| {
                    let cell = Vec3::new(i as f32, j as f32, k as f32) + 0.5;
                    grid.align_floor(min + cell * grid.size)
                })
            })
        })
    }
}

fn snap(v: Vec3, round: fn(f32) -> f32) -> Vec3 {
    let axis = |x: f32| {
        let nearest = x.round();
        let slack = x.abs().max(1.0) * SNAP_ULPS * f32::EPSILON;
        let snapped = if (x - nearest).abs() <= slack { nearest } else { round(x) };
        // Normalizes -0.0
        snapped + 0.0
    };
    Vec3::new(axis(v.x), axis(v.y), axis(v.z))
}

/// Index of the subspace around `center` that contains `p`.
///
/// Bit `k` is set iff `p[k] >= center[k]`. Build, insertion, deletion and
/// queries all number the eight children this way.
#[inline]
pub fn subspace_index(center: Point, p: Point) -> usize {
    (p.x >= center.x) as usize
        | ((p.y >= center.y) as usize) << 1
        | ((p.z >= center.z) as usize) << 2
}
