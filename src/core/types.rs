//! Core type aliases and re-exports

pub use glam::{Vec3, UVec3};

/// A voxel position or a point in space.
///
/// Voxels are identified by their minimum corner, so a voxel point is always
/// a multiple of the grid's voxel size on every axis.
pub type Point = Vec3;

/// Standard Result type for the crate
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;
