//! Adaptive voxel tree
//!
//! `VoxTree` owns a root slot and the grid it was built on. Everything
//! below it works on plain `Slot`s so that nodes can replace themselves
//! during edits.

pub mod node;
pub mod builder;
pub mod edit;
pub mod flatten;
pub mod search;
pub mod stats;

pub use node::{DenseLeaf, InnerNode, Node, Slot, SparseLeaf, CHILDREN, MAX_DOTS};
pub use search::{RayHit, RayQuery, TreePath};
pub use stats::TreeStats;

use std::time::Instant;

use crate::core::config::{TreeConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_LOCAL_DEPTH};
use crate::core::types::{Point, Vec3};
use crate::math::{Aabb, Ray};
use crate::voxel::grid::VoxelGrid;

/// Spatial index over voxels of one grid
#[derive(Clone, Debug, PartialEq)]
pub struct VoxTree {
    root: Slot,
    grid: VoxelGrid,
    lod: usize,
    max_depth: usize,
    max_local_depth: usize,
}

impl Default for VoxTree {
    fn default() -> Self {
        Self::new(VoxelGrid::default())
    }
}

impl VoxTree {
    /// Empty tree on the given grid
    pub fn new(grid: VoxelGrid) -> Self {
        Self {
            root: None,
            grid,
            lod: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            max_local_depth: DEFAULT_MAX_LOCAL_DEPTH,
        }
    }

    /// Empty tree with grid and query settings taken from `config`
    pub fn with_config(config: &TreeConfig) -> Self {
        Self {
            root: None,
            grid: config.grid(),
            lod: config.lod as usize,
            max_depth: config.max_depth,
            max_local_depth: config.max_local_depth,
        }
    }

    /// Bulk build from distinct voxels that are already aligned to `grid`.
    ///
    /// The slice is reordered in place. Panics on duplicate voxels; use
    /// [`VoxTree::from_voxels`] for raw input.
    pub fn build(grid: VoxelGrid, voxels: &mut [Point]) -> Self {
        let mut tree = Self::new(grid);
        tree.build_root(voxels);
        tree
    }

    /// Align and deduplicate arbitrary points, then build
    pub fn from_voxels(grid: VoxelGrid, voxels: Vec<Point>) -> Self {
        let mut voxels = grid.align_voxels(voxels);
        Self::build(grid, &mut voxels)
    }

    /// Like [`VoxTree::build`], with grid and query settings from `config`
    pub fn build_with_config(config: &TreeConfig, voxels: &mut [Point]) -> Self {
        let mut tree = Self::with_config(config);
        tree.build_root(voxels);
        tree
    }

    fn build_root(&mut self, voxels: &mut [Point]) {
        let start = Instant::now();
        self.root = builder::build(voxels, &self.grid);
        log::debug!(
            "Built tree of {} voxels in {:.2?}",
            voxels.len(),
            start.elapsed()
        );
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// Depth at which ray queries stop and report the box entry point
    pub fn lod(&self) -> usize {
        self.lod
    }

    /// Set the ray query level of detail; 0 means full precision
    pub fn set_lod(&mut self, lod: usize) {
        self.lod = lod;
    }

    /// Insert a voxel, aligning it to the grid first.
    ///
    /// Returns false if the voxel was already present.
    pub fn insert(&mut self, voxel: Point) -> bool {
        let voxel = self.grid.align_floor(voxel);
        edit::insert(&mut self.root, voxel, &self.grid)
    }

    /// Delete a voxel, aligning it to the grid first.
    ///
    /// Returns false if the voxel was not present. Bounding boxes are not
    /// shrunk; call [`VoxTree::rebuild`] after many deletions.
    pub fn delete(&mut self, voxel: Point) -> bool {
        let voxel = self.grid.align_floor(voxel);
        edit::delete(&mut self.root, voxel, &self.grid)
    }

    /// True if the voxel containing `voxel` is stored
    pub fn contains(&self, voxel: Point) -> bool {
        edit::contains(&self.root, self.grid.align_floor(voxel))
    }

    /// Every stored voxel, in child order
    pub fn flatten(&self) -> Vec<Point> {
        match &self.root {
            Some(node) => flatten::flatten(node, &self.grid),
            None => Vec::new(),
        }
    }

    /// A freshly built copy of this tree.
    ///
    /// Tightens boxes left loose by deletions and collapses regions that
    /// became dense through insertions.
    pub fn rebuild(&self) -> VoxTree {
        let start = Instant::now();
        let mut voxels = self.flatten();
        let root = builder::build(&mut voxels, &self.grid);
        log::debug!(
            "Rebuilt tree of {} voxels in {:.2?}",
            voxels.len(),
            start.elapsed()
        );
        VoxTree { root, ..self.clone_settings() }
    }

    fn clone_settings(&self) -> VoxTree {
        VoxTree {
            root: None,
            grid: self.grid,
            lod: self.lod,
            max_depth: self.max_depth,
            max_local_depth: self.max_local_depth,
        }
    }

    /// Bounding box of the stored voxels, `None` for an empty tree
    pub fn bounding_box(&self) -> Option<Aabb> {
        self.root.as_ref().map(|node| *node.bounding_box())
    }

    pub fn voxel_count(&self) -> usize {
        self.root.as_ref().map_or(0, Node::voxel_count)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Drop all nodes
    pub fn clear(&mut self) {
        self.root = None;
    }

    fn query(&self) -> RayQuery<'_> {
        RayQuery {
            grid: &self.grid,
            lod: self.lod,
            max_depth: self.max_depth,
            max_local_depth: self.max_local_depth,
        }
    }

    /// Nearest intersection of a ray with the stored voxels
    pub fn ray_intersect(&self, origin: Point, direction: Vec3) -> Option<RayHit> {
        let mut path = TreePath::new();
        self.ray_intersect_with_path(origin, direction, &mut path)
    }

    /// Like [`VoxTree::ray_intersect`], recording the visited nodes in `path`
    /// for later [`VoxTree::local_ray_intersect`] calls
    pub fn ray_intersect_with_path<'a>(
        &'a self,
        origin: Point,
        direction: Vec3,
        path: &mut TreePath<'a>,
    ) -> Option<RayHit> {
        let ray = Ray::new(origin, direction);
        search::ray_intersect(&self.root, &ray, &self.query(), path)
    }

    /// Retry a ray near the end of a path recorded on this tree.
    ///
    /// `None` does not mean the ray misses the tree, only that a full
    /// query is needed.
    pub fn local_ray_intersect(
        &self,
        path: &TreePath<'_>,
        origin: Point,
        direction: Vec3,
    ) -> Option<RayHit> {
        let ray = Ray::new(origin, direction);
        search::local_ray_intersect(path, &ray, &self.query())
    }

    /// True if any voxel overlaps the solid ball
    pub fn ball_collide(&self, center: Point, radius: f32) -> bool {
        search::ball_collide(&self.root, center, radius, &self.grid)
    }

    /// Node and occupancy statistics
    pub fn stats(&self) -> TreeStats {
        TreeStats::collect(&self.root, &self.grid)
    }

    /// Verify the structural invariants of the whole tree
    pub fn check_invariants(&self) -> Result<usize, String> {
        match &self.root {
            Some(node) => node.check_invariants(&self.grid),
            None => Ok(0),
        }
    }
}
