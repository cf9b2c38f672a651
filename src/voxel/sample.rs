//! Procedural voxel sets for demos, benchmarks and tests
//!
//! All generators take sizes in voxels and return distinct points aligned
//! to the given grid.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::core::types::{Point, Vec3};
use crate::voxel::grid::VoxelGrid;

fn voxel_at(i: i32, j: i32, k: i32, grid: &VoxelGrid) -> Point {
    grid.align_floor(Vec3::new(i as f32, j as f32, k as f32) * grid.size())
}

fn cube_len(k: u32) -> usize {
    let k = k as usize;
    k * k * k
}

/// Solid `k`x`k`x`k` cube with a corner at the origin
pub fn cube(k: u32, grid: &VoxelGrid) -> Vec<Point> {
    let mut points = Vec::with_capacity(cube_len(k));
    let k = k as i32;
    for i in 0..k {
        for j in 0..k {
            for l in 0..k {
                points.push(voxel_at(i, j, l, grid));
            }
        }
    }
    points
}

/// Solid ball of voxels centered on the origin.
///
/// A voxel belongs to the ball if its center lies within `radius` voxels.
pub fn sphere(radius: u32, grid: &VoxelGrid) -> Vec<Point> {
    let r = radius as i32;
    let limit = radius as f32 * radius as f32;
    let mut points = Vec::new();
    for i in -r..r {
        for j in -r..r {
            for k in -r..r {
                let center = Vec3::new(i as f32, j as f32, k as f32) + 0.5;
                if center.length_squared() <= limit {
                    points.push(voxel_at(i, j, k, grid));
                }
            }
        }
    }
    points
}

/// Heightfield terrain of `size`x`size` columns, filled from y = 0.
///
/// Column heights follow fractal Perlin noise and range from 1 to
/// `height` voxels.
pub fn terrain(size: u32, seed: u32, height: u32, grid: &VoxelGrid) -> Vec<Point> {
    let noise = Fbm::<Perlin>::new(seed)
        .set_octaves(4)
        .set_persistence(0.5)
        .set_lacunarity(2.0);
    let scale = (size as f64 / 4.0).max(1.0);
    let height = height.max(1);

    let mut points = Vec::new();
    for x in 0..size as i32 {
        for z in 0..size as i32 {
            let value = noise.get([x as f64 / scale, z as f64 / scale]);
            let normalized = ((value + 1.0) / 2.0).clamp(0.0, 1.0);
            let column = ((normalized * height as f64) as u32).clamp(1, height);
            for y in 0..column as i32 {
                points.push(voxel_at(x, y, z, grid));
            }
        }
    }
    log::debug!("Generated terrain of {} voxels ({}x{}, seed {})", points.len(), size, size, seed);
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube() {
        let grid = VoxelGrid::new(Vec3::splat(0.5));
        let points = cube(3, &grid);
        assert_eq!(points.len(), 27);
        assert!(points.contains(&Vec3::splat(1.0)));
        assert_eq!(grid.align_voxels(points.clone()).len(), 27);
    }

    #[test]
    fn test_cube_len_beyond_i32() {
        // 1291^3 overflows i32
        assert_eq!(cube_len(1291), 2_151_685_171);
        assert_eq!(cube_len(0), 0);
        assert!(cube(0, &VoxelGrid::default()).is_empty());
        assert_eq!(cube(1, &VoxelGrid::default()), vec![Vec3::ZERO]);
    }

    #[test]
    fn test_sphere() {
        let grid = VoxelGrid::default();
        let points = sphere(4, &grid);
        assert!(points.contains(&Vec3::ZERO));
        assert!(points.contains(&Vec3::new(-1.0, -1.0, -1.0)));
        assert!(!points.contains(&Vec3::new(3.0, 3.0, 3.0)));
        // Symmetric about the origin
        for p in &points {
            assert!(points.contains(&(-*p - Vec3::ONE)));
        }
        assert!(sphere(0, &grid).is_empty());
    }

    #[test]
    fn test_terrain_columns() {
        let grid = VoxelGrid::default();
        let points = terrain(16, 7, 10, &grid);
        assert!(points.len() >= 16 * 16);
        assert!(points.len() <= 16 * 16 * 10);
        for x in 0..16 {
            for z in 0..16 {
                assert!(points.contains(&Vec3::new(x as f32, 0.0, z as f32)));
            }
        }
        assert_eq!(points, terrain(16, 7, 10, &grid));
        assert_eq!(grid.align_voxels(points.clone()).len(), points.len());
    }
}
