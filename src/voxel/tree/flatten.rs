//! Turning a tree back into a plain voxel array

use super::node::Node;
use crate::core::types::Point;
use crate::voxel::grid::VoxelGrid;

/// Append every voxel of the subtree to `out`.
///
/// Dense leaves are stepped through on the grid; inner nodes emit their
/// children in index order.
pub fn flatten_into(node: &Node, grid: &VoxelGrid, out: &mut Vec<Point>) {
    match node {
        Node::Sparse(leaf) => out.extend_from_slice(&leaf.voxels),
        Node::Dense(leaf) => out.extend(grid.voxels_in(&leaf.bbox)),
        Node::Inner(inner) => {
            for child in inner.children().iter().flatten() {
                flatten_into(child, grid, out);
            }
        }
    }
}

/// All voxels of the subtree as a new array
pub fn flatten(node: &Node, grid: &VoxelGrid) -> Vec<Point> {
    let mut out = Vec::with_capacity(node.voxel_count());
    flatten_into(node, grid, &mut out);
    debug_assert_eq!(out.len(), node.voxel_count());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec3;
    use crate::math::Aabb;
    use crate::voxel::tree::builder::build;
    use crate::voxel::tree::node::DenseLeaf;

    #[test]
    fn test_flatten_dense_leaf() {
        let grid = VoxelGrid::new(Vec3::new(0.5, 1.0, 1.0));
        let node = Node::Dense(DenseLeaf::new(Aabb::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 2.0)), 4));
        let voxels = flatten(&node, &grid);
        assert_eq!(
            voxels,
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(0.5, 0.0, 0.0),
                Vec3::new(0.5, 0.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_flatten_recovers_input_set() {
        let grid = VoxelGrid::default();
        let mut input: Vec<Point> = (0..100)
            .map(|i| Vec3::new((i % 7) as f32, (i / 7) as f32, ((i * 3) % 5) as f32))
            .collect();
        let node = build(&mut input.clone(), &grid).unwrap();

        let mut output = flatten(&node, &grid);
        let key = |p: &Point| (p.x as i32, p.y as i32, p.z as i32);
        input.sort_by_key(key);
        output.sort_by_key(key);
        assert_eq!(input, output);
    }
}
