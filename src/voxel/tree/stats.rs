//! Tree statistics

use std::fmt;

use super::node::{Node, Slot};
use crate::voxel::grid::VoxelGrid;

/// Number of buckets in the sparse leaf fill histogram
pub const FILL_BUCKETS: usize = 10;

/// Node counts and occupancy of a tree, collected by a full traversal
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeStats {
    pub inner_nodes: usize,
    pub sparse_leaves: usize,
    pub dense_leaves: usize,
    /// Voxels stored explicitly in sparse leaves
    pub sparse_voxels: usize,
    /// Voxels represented by dense leaves
    pub dense_voxels: usize,
    /// Child slots of inner nodes holding no subtree
    pub empty_slots: usize,
    /// Number of leaves per depth, root at depth 1
    pub leaf_depths: Vec<usize>,
    /// Sparse leaves bucketed by voxel count over box capacity
    pub fill_ratios: [usize; FILL_BUCKETS],
    /// Unoccupied volume inside sparse leaf boxes
    pub empty_volume: f64,
}

impl TreeStats {
    pub fn collect(root: &Slot, grid: &VoxelGrid) -> Self {
        let mut stats = Self::default();
        if let Some(node) = root {
            stats.visit(node, 1, grid);
        }
        stats
    }

    fn visit(&mut self, node: &Node, depth: usize, grid: &VoxelGrid) {
        match node {
            Node::Sparse(leaf) => {
                self.sparse_leaves += 1;
                self.sparse_voxels += leaf.voxels.len();
                self.record_leaf(depth);

                let capacity = grid.capacity(&leaf.bbox).max(1);
                let count = leaf.voxels.len() as u64;
                let ratio = count as f64 / capacity as f64;
                let bucket = ((ratio * FILL_BUCKETS as f64) as usize).min(FILL_BUCKETS - 1);
                self.fill_ratios[bucket] += 1;
                self.empty_volume +=
                    capacity.saturating_sub(count) as f64 * grid.voxel_volume() as f64;
            }
            Node::Dense(leaf) => {
                self.dense_leaves += 1;
                self.dense_voxels += leaf.count;
                self.record_leaf(depth);
            }
            Node::Inner(inner) => {
                self.inner_nodes += 1;
                for child in inner.children() {
                    match child {
                        Some(child) => self.visit(child, depth + 1, grid),
                        None => self.empty_slots += 1,
                    }
                }
            }
        }
    }

    fn record_leaf(&mut self, depth: usize) {
        if self.leaf_depths.len() <= depth {
            self.leaf_depths.resize(depth + 1, 0);
        }
        self.leaf_depths[depth] += 1;
    }

    pub fn leaf_count(&self) -> usize {
        self.sparse_leaves + self.dense_leaves
    }

    pub fn node_count(&self) -> usize {
        self.inner_nodes + self.leaf_count()
    }

    pub fn voxel_count(&self) -> usize {
        self.sparse_voxels + self.dense_voxels
    }

    /// Depth of the deepest leaf, 0 for an empty tree
    pub fn depth(&self) -> usize {
        self.leaf_depths.len().saturating_sub(1)
    }
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "voxels:        {}", self.voxel_count())?;
        writeln!(
            f,
            "nodes:         {} ({} inner, {} sparse, {} dense)",
            self.node_count(),
            self.inner_nodes,
            self.sparse_leaves,
            self.dense_leaves
        )?;
        writeln!(f, "dense voxels:  {}", self.dense_voxels)?;
        writeln!(f, "empty slots:   {}", self.empty_slots)?;
        writeln!(f, "depth:         {}", self.depth())?;
        writeln!(f, "empty volume:  {:.3}", self.empty_volume)?;
        writeln!(f, "leaves by depth:")?;
        for (depth, count) in self.leaf_depths.iter().enumerate().filter(|(_, c)| **c > 0) {
            writeln!(f, "  {:>3}: {}", depth, count)?;
        }
        write!(f, "sparse fill:  ")?;
        for count in &self.fill_ratios {
            write!(f, " {}", count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Point, Vec3};
    use crate::voxel::tree::builder::build;

    #[test]
    fn test_empty() {
        let stats = TreeStats::collect(&None, &VoxelGrid::default());
        assert_eq!(stats, TreeStats::default());
        assert_eq!(stats.depth(), 0);
    }

    #[test]
    fn test_dense_cube() {
        let grid = VoxelGrid::default();
        let mut points = Vec::new();
        for x in 0..3 {
            for y in 0..3 {
                for z in 0..3 {
                    points.push(Vec3::new(x as f32, y as f32, z as f32));
                }
            }
        }
        let stats = TreeStats::collect(&build(&mut points, &grid), &grid);
        assert_eq!(stats.dense_leaves, 1);
        assert_eq!(stats.dense_voxels, 27);
        assert_eq!(stats.leaf_depths, vec![0, 1]);
        assert_eq!(stats.empty_volume, 0.0);
    }

    #[test]
    fn test_sparse_leaf_fill() {
        let grid = VoxelGrid::default();
        let mut points = vec![Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 1.0)];
        let stats = TreeStats::collect(&build(&mut points, &grid), &grid);
        assert_eq!(stats.sparse_leaves, 1);
        // 3 voxels in a 6x4x2 box
        assert_eq!(stats.fill_ratios[0], 1);
        assert_eq!(stats.empty_volume, 45.0);
    }

    #[test]
    fn test_counts_add_up() {
        let grid = VoxelGrid::default();
        let mut points: Vec<Point> = (0..100)
            .map(|i| Vec3::new((i % 10) as f32 * 3.0, (i / 10) as f32 * 3.0, 0.0))
            .collect();
        let root = build(&mut points, &grid);
        let stats = TreeStats::collect(&root, &grid);
        assert_eq!(stats.voxel_count(), 100);
        assert!(stats.inner_nodes > 0);
        assert_eq!(stats.empty_slots + stats.node_count() - 1, stats.inner_nodes * 8);
        assert_eq!(stats.leaf_depths.iter().sum::<usize>(), stats.leaf_count());

        let text = stats.to_string();
        assert!(text.contains("voxels:        100"));
    }
}
