//! Voxel grid, tree and the data sources feeding it

pub mod grid;
pub mod tree;
pub mod shared;
pub mod reader;
pub mod sample;

pub use grid::{subspace_index, VoxelGrid};
pub use tree::{Node, RayHit, TreePath, TreeStats, VoxTree, MAX_DOTS};
pub use shared::SharedTree;
pub use reader::{read_raw, read_raw_points, RawFormat};
