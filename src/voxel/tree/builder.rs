//! Top-down bulk construction
//!
//! The voxel array is partitioned in place: each recursion level reorders
//! its range into eight contiguous runs, one per subspace, and descends
//! into each run. Leaves copy their run out; nothing else is allocated.

use glam::DVec3;

use super::node::{DenseLeaf, InnerNode, Node, Slot, SparseLeaf, CHILDREN, MAX_DOTS};
use crate::core::types::Point;
use crate::math::Aabb;
use crate::voxel::grid::{subspace_index, VoxelGrid};

/// Build a tree from distinct, grid-aligned voxels.
///
/// The slice is reordered. Duplicate voxels are a precondition violation:
/// more than `MAX_DOTS` copies of one voxel can never be split apart and
/// trip the partition assertion.
pub fn build(voxels: &mut [Point], grid: &VoxelGrid) -> Slot {
    let n = voxels.len();
    let bbox = Aabb::from_voxels(voxels, grid.size())?;

    // Checked on every level so that large solid regions collapse early
    if grid.is_dense(&bbox, n) {
        return Some(Node::Dense(DenseLeaf::new(bbox, n)));
    }

    if n <= MAX_DOTS {
        let mut stored = Vec::with_capacity(MAX_DOTS);
        stored.extend_from_slice(voxels);
        return Some(Node::Sparse(SparseLeaf::new(bbox, stored)));
    }

    // Aligning the center keeps every voxel entirely on one side of each plane
    let center = grid.align_ceil(centroid(voxels));

    let mut children: [Slot; CHILDREN] = Default::default();
    let mut rest = voxels;
    for (idx, child) in children.iter_mut().enumerate() {
        let run_len = partition(rest, idx, center);
        assert!(
            run_len != n,
            "subspace {} around {} claims all {} voxels; input has duplicates?",
            idx, center, n
        );
        let (run, tail) = std::mem::take(&mut rest).split_at_mut(run_len);
        *child = build(run, grid);
        rest = tail;
    }

    Some(Node::Inner(Box::new(InnerNode {
        bbox,
        count: n,
        center,
        children,
    })))
}

/// Mean of all voxels, accumulated in double precision
fn centroid(voxels: &[Point]) -> Point {
    let sum: DVec3 = voxels.iter().map(|p| p.as_dvec3()).sum();
    (sum / voxels.len() as f64).as_vec3()
}

/// Move the voxels of subspace `idx` to the front, returning how many moved
fn partition(voxels: &mut [Point], idx: usize, center: Point) -> usize {
    let mut front = 0;
    for i in 0..voxels.len() {
        if subspace_index(center, voxels[i]) == idx {
            voxels.swap(front, i);
            front += 1;
        }
    }
    front
}
