//! Tree nodes
//!
//! An empty subtree is `None` in its parent's slot; every allocated node
//! holds at least one voxel.

use crate::core::types::Point;
use crate::math::Aabb;
use crate::voxel::grid::{subspace_index, VoxelGrid};

/// Maximum number of voxels stored in a sparse leaf
pub const MAX_DOTS: usize = 16;

/// Number of children of an inner node (2^3)
pub const CHILDREN: usize = 8;

/// Child slot of an inner node, or the root of a tree
pub type Slot = Option<Node>;

/// A node of the voxel tree
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Explicit list of up to `MAX_DOTS` voxels
    Sparse(SparseLeaf),
    /// Fully occupied block of voxels, stored as its box only
    Dense(DenseLeaf),
    /// Division of space into eight subspaces around a center
    Inner(Box<InnerNode>),
}

/// Leaf storing its voxels explicitly
#[derive(Clone, Debug, PartialEq)]
pub struct SparseLeaf {
    pub(crate) bbox: Aabb,
    pub(crate) voxels: Vec<Point>,
}

/// Leaf covering its bounding box with voxels, without gaps
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DenseLeaf {
    pub(crate) bbox: Aabb,
    pub(crate) count: usize,
}

/// Inner node with eight independently owned children
#[derive(Clone, Debug, PartialEq)]
pub struct InnerNode {
    pub(crate) bbox: Aabb,
    pub(crate) count: usize,
    pub(crate) center: Point,
    pub(crate) children: [Slot; CHILDREN],
}

impl SparseLeaf {
    pub(crate) fn new(bbox: Aabb, voxels: Vec<Point>) -> Self {
        debug_assert!(!voxels.is_empty() && voxels.len() <= MAX_DOTS);
        Self { bbox, voxels }
    }

    /// Leaf holding just one voxel
    pub(crate) fn single(voxel: Point, grid: &VoxelGrid) -> Self {
        let mut voxels = Vec::with_capacity(MAX_DOTS);
        voxels.push(voxel);
        Self { bbox: grid.voxel_box(voxel), voxels }
    }

    /// Append a voxel that is not stored yet
    pub(crate) fn push(&mut self, voxel: Point, grid: &VoxelGrid) {
        debug_assert!(self.voxels.len() < MAX_DOTS);
        self.bbox.expand_voxel(voxel, grid.size());
        self.voxels.push(voxel);
    }

    pub fn voxels(&self) -> &[Point] {
        &self.voxels
    }

    pub fn is_full(&self) -> bool {
        self.voxels.len() >= MAX_DOTS
    }
}

impl DenseLeaf {
    pub(crate) fn new(bbox: Aabb, count: usize) -> Self {
        Self { bbox, count }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl InnerNode {
    /// Division point of the node
    pub fn center(&self) -> Point {
        self.center
    }

    /// Child slots in subspace index order
    pub fn children(&self) -> &[Slot; CHILDREN] {
        &self.children
    }
}

impl Node {
    /// Bounding box of all voxels below this node.
    ///
    /// Deleting voxels never shrinks it, so it may be larger than needed
    /// until the tree is rebuilt.
    pub fn bounding_box(&self) -> &Aabb {
        match self {
            Node::Sparse(leaf) => &leaf.bbox,
            Node::Dense(leaf) => &leaf.bbox,
            Node::Inner(inner) => &inner.bbox,
        }
    }

    /// Number of voxels below this node
    pub fn voxel_count(&self) -> usize {
        match self {
            Node::Sparse(leaf) => leaf.voxels.len(),
            Node::Dense(leaf) => leaf.count,
            Node::Inner(inner) => inner.count,
        }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, Node::Inner(_))
    }

    /// Verify the structural invariants of this subtree.
    ///
    /// Returns the number of voxels found, or a description of the first
    /// violation.
    pub fn check_invariants(&self, grid: &VoxelGrid) -> Result<usize, String> {
        match self {
            Node::Sparse(leaf) => {
                let n = leaf.voxels.len();
                if n == 0 || n > MAX_DOTS {
                    return Err(format!("sparse leaf holds {} voxels", n));
                }
                for (i, v) in leaf.voxels.iter().enumerate() {
                    if leaf.voxels[..i].contains(v) {
                        return Err(format!("duplicate voxel {} in sparse leaf", v));
                    }
                    if !leaf.bbox.contains_box(&grid.voxel_box(*v)) {
                        return Err(format!("voxel {} outside leaf box {:?}", v, leaf.bbox));
                    }
                }
                Ok(n)
            }
            Node::Dense(leaf) => {
                if !grid.is_dense(&leaf.bbox, leaf.count) {
                    return Err(format!(
                        "dense leaf of {} voxels does not fill {:?}",
                        leaf.count, leaf.bbox
                    ));
                }
                Ok(leaf.count)
            }
            Node::Inner(inner) => {
                let mut total = 0;
                for (idx, child) in inner.children.iter().enumerate() {
                    let Some(child) = child else { continue };
                    let child_box = child.bounding_box();
                    let octant = inner.bbox.divide(inner.center, idx).ok_or_else(|| {
                        format!("child {} exists but its subspace is empty", idx)
                    })?;
                    if !octant.contains_box(child_box) {
                        return Err(format!(
                            "child {} box {:?} leaves its subspace {:?}",
                            idx, child_box, octant
                        ));
                    }
                    // The box corners of a non-empty child must index back to it
                    if subspace_index(inner.center, child_box.min) != idx {
                        return Err(format!("child {} is stored in the wrong slot", idx));
                    }
                    total += child.check_invariants(grid)?;
                }
                if total == 0 || total != inner.count {
                    return Err(format!(
                        "inner node count {} but children hold {}",
                        inner.count, total
                    ));
                }
                Ok(total)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec3;

    #[test]
    fn test_single_leaf() {
        let grid = VoxelGrid::default();
        let leaf = SparseLeaf::single(Vec3::new(2.0, 3.0, 4.0), &grid);
        let node = Node::Sparse(leaf);
        assert_eq!(node.voxel_count(), 1);
        assert!(node.is_leaf());
        assert_eq!(node.bounding_box().max, Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(node.check_invariants(&grid), Ok(1));
    }

    #[test]
    fn test_push_expands_box() {
        let grid = VoxelGrid::default();
        let mut leaf = SparseLeaf::single(Vec3::ZERO, &grid);
        leaf.push(Vec3::new(-1.0, 5.0, 0.0), &grid);
        assert_eq!(leaf.bbox, Aabb::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 6.0, 1.0)));
        assert!(!leaf.is_full());
    }

    #[test]
    fn test_invariants_reject_duplicates() {
        let grid = VoxelGrid::default();
        let node = Node::Sparse(SparseLeaf::new(
            Aabb::new(Vec3::ZERO, Vec3::ONE),
            vec![Vec3::ZERO, Vec3::ZERO],
        ));
        assert!(node.check_invariants(&grid).is_err());
    }

    #[test]
    fn test_invariants_reject_gappy_dense_leaf() {
        let grid = VoxelGrid::default();
        let node = Node::Dense(DenseLeaf::new(Aabb::new(Vec3::ZERO, Vec3::splat(2.0)), 7));
        assert!(node.check_invariants(&grid).is_err());
    }

    #[test]
    fn test_invariants_reject_misplaced_child() {
        let grid = VoxelGrid::default();
        let mut children: [Slot; CHILDREN] = Default::default();
        // Voxel at the origin belongs in subspace 0, not 7
        children[7] = Some(Node::Sparse(SparseLeaf::single(Vec3::ZERO, &grid)));
        let node = Node::Inner(Box::new(InnerNode {
            bbox: Aabb::new(Vec3::ZERO, Vec3::splat(2.0)),
            count: 1,
            center: Vec3::ONE,
            children,
        }));
        assert!(node.check_invariants(&grid).is_err());
    }
}
