//! Single-voxel insertion and deletion
//!
//! Both operate on a slot so that a node can replace itself: a full sparse
//! leaf turns into a subtree, a dense leaf is downgraded or wrapped into an
//! inner node, and a node that loses its last voxel becomes `None`.
//!
//! Callers align the voxel to the grid first. Deletion never shrinks
//! bounding boxes of surviving nodes; they stay a valid superset and are
//! tightened by the next rebuild.

use super::builder::build;
use super::node::{DenseLeaf, InnerNode, Node, Slot, SparseLeaf, CHILDREN, MAX_DOTS};
use crate::core::types::Point;
use crate::voxel::grid::{subspace_index, VoxelGrid};

/// Insert an aligned voxel. Returns false if it was already present.
pub fn insert(slot: &mut Slot, voxel: Point, grid: &VoxelGrid) -> bool {
    match slot {
        None => {
            *slot = Some(Node::Sparse(SparseLeaf::single(voxel, grid)));
            true
        }
        Some(Node::Sparse(leaf)) => {
            if leaf.voxels.contains(&voxel) {
                return false;
            }
            if !leaf.is_full() {
                leaf.push(voxel, grid);
            } else {
                let mut voxels = std::mem::take(&mut leaf.voxels);
                voxels.push(voxel);
                log::trace!("Splitting full leaf at {}", voxel);
                *slot = build(&mut voxels, grid);
            }
            true
        }
        Some(Node::Dense(dense)) => {
            // No gaps, so anything inside the box is already there
            if dense.bbox.contains_voxel(voxel) {
                return false;
            }
            let dense = *dense;
            if dense.count < MAX_DOTS {
                let mut voxels: Vec<Point> = grid.voxels_in(&dense.bbox).collect();
                voxels.push(voxel);
                log::trace!("Downgrading dense leaf of {} voxels", dense.count);
                *slot = build(&mut voxels, grid);
            } else {
                log::trace!("Wrapping dense leaf of {} voxels into inner node", dense.count);
                *slot = Some(Node::Inner(wrap_dense(dense, voxel, grid)));
            }
            true
        }
        Some(Node::Inner(inner)) => {
            let idx = subspace_index(inner.center, voxel);
            inner.bbox.expand_voxel(voxel, grid.size());
            let changed = insert(&mut inner.children[idx], voxel, grid);
            if changed {
                inner.count += 1;
            }
            changed
        }
    }
}

/// Put a dense leaf and a voxel outside of it under a new inner node.
///
/// The center is the box vertex nearest to the voxel, which always leaves
/// the two in different subspaces.
fn wrap_dense(dense: DenseLeaf, voxel: Point, grid: &VoxelGrid) -> Box<InnerNode> {
    let center = dense.bbox.closest_vertex(voxel);
    let dense_idx = subspace_index(center, dense.bbox.center());
    let voxel_idx = subspace_index(center, voxel);
    assert_ne!(
        dense_idx, voxel_idx,
        "voxel {} shares a subspace with dense leaf {:?}",
        voxel, dense.bbox
    );

    let mut bbox = dense.bbox;
    bbox.expand_voxel(voxel, grid.size());

    let mut children: [Slot; CHILDREN] = Default::default();
    children[dense_idx] = Some(Node::Dense(dense));
    children[voxel_idx] = Some(Node::Sparse(SparseLeaf::single(voxel, grid)));

    Box::new(InnerNode {
        bbox,
        count: dense.count + 1,
        center,
        children,
    })
}

/// Delete an aligned voxel. Returns false if it was not present.
pub fn delete(slot: &mut Slot, voxel: Point, grid: &VoxelGrid) -> bool {
    let Some(node) = slot else {
        return false;
    };
    if !node.bounding_box().contains_voxel(voxel) {
        return false;
    }

    match node {
        Node::Sparse(leaf) => {
            let Some(pos) = leaf.voxels.iter().position(|v| *v == voxel) else {
                return false;
            };
            leaf.voxels.remove(pos);
            if leaf.voxels.is_empty() {
                *slot = None;
            }
            true
        }
        Node::Dense(dense) => {
            // Dense leaves keep no voxel list to edit, so rebuild the rest
            let count = dense.count;
            let mut voxels: Vec<Point> = grid
                .voxels_in(&dense.bbox)
                .filter(|v| *v != voxel)
                .collect();
            assert_eq!(
                voxels.len() + 1,
                count,
                "voxel {} inside dense leaf box but not generated from it",
                voxel
            );
            log::trace!("Breaking up dense leaf of {} voxels", count);
            *slot = build(&mut voxels, grid);
            true
        }
        Node::Inner(inner) => {
            let idx = subspace_index(inner.center, voxel);
            if !delete(&mut inner.children[idx], voxel, grid) {
                return false;
            }
            inner.count -= 1;
            if inner.count == 0 {
                *slot = None;
            }
            true
        }
    }
}

/// True if the aligned voxel is stored below this slot
pub fn contains(slot: &Slot, voxel: Point) -> bool {
    let Some(node) = slot else {
        return false;
    };
    if !node.bounding_box().contains_voxel(voxel) {
        return false;
    }
    match node {
        Node::Sparse(leaf) => leaf.voxels.contains(&voxel),
        Node::Dense(_) => true,
        Node::Inner(inner) => contains(&inner.children[subspace_index(inner.center, voxel)], voxel),
    }
}
