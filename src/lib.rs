//! Voxtree - An adaptive spatial index over grid-aligned voxels
//!
//! Voxels are built into a tree of sparse leaves, dense leaves and inner
//! nodes that split space into eight subspaces. The tree answers nearest
//! ray intersections and ball collisions, and supports single-voxel edits
//! with periodic rebuilds.

pub mod core;
pub mod math;
pub mod voxel;

pub use crate::core::{Error, Point, Result, TreeConfig};
pub use crate::math::{Aabb, Ray};
pub use crate::voxel::{RayHit, SharedTree, TreePath, VoxTree, VoxelGrid};
