//! Ray and ball queries
//!
//! Ray casting visits the subspaces of an inner node in the order the ray
//! passes through them, so the first hit found is the nearest one and the
//! remaining subspaces are never touched.

use super::node::{Node, Slot};
use crate::core::types::{Point, Vec3};
use crate::math::{abs_metric, closest_in_set, Ray};
use crate::voxel::grid::{subspace_index, VoxelGrid};

/// Result of a ray query
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Entry point of the ray into the voxel that was hit
    pub point: Point,
    /// Depth of the node the hit was found in, counting the start node as 1.
    /// For a local search this is how many path levels were climbed instead.
    pub depth: usize,
}

/// Nodes visited from the root to the leaf that produced the last hit.
///
/// The path borrows the tree, so it cannot outlive a mutation of it.
#[derive(Clone, Debug, Default)]
pub struct TreePath<'a> {
    nodes: Vec<&'a Node>,
}

impl<'a> TreePath<'a> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

/// Per-query parameters
#[derive(Clone, Copy, Debug)]
pub struct RayQuery<'g> {
    pub grid: &'g VoxelGrid,
    /// Depth at which the box entry point is reported as the hit; 0 = never
    pub lod: usize,
    /// Recursion cap
    pub max_depth: usize,
    /// Levels a local search may climb
    pub max_local_depth: usize,
}

/// Cast a ray into the subtree, recording visited nodes in `path`
pub fn ray_intersect<'a>(
    slot: &'a Slot,
    ray: &Ray,
    query: &RayQuery<'_>,
    path: &mut TreePath<'a>,
) -> Option<RayHit> {
    path.clear();
    let node = slot.as_ref()?;
    ray_node(node, ray, 1, query, &mut path.nodes)
}

/// Retry a ray from the tail of an earlier path before a full search.
///
/// Starts at the last node of `path` and climbs one level per miss, up to
/// `max_local_depth` levels. Coherent rays (neighbouring pixels, the next
/// frame) usually hit within the same subtree. A `None` means the caller
/// must fall back to a full query.
pub fn local_ray_intersect(path: &TreePath<'_>, ray: &Ray, query: &RayQuery<'_>) -> Option<RayHit> {
    let n = path.len();
    let mut scratch = Vec::new();
    for climb in 1..=n.min(query.max_local_depth) {
        scratch.clear();
        if let Some(hit) = ray_node(path.nodes[n - climb], ray, 1, query, &mut scratch) {
            return Some(RayHit { point: hit.point, depth: climb });
        }
    }
    None
}

fn ray_node<'a>(
    node: &'a Node,
    ray: &Ray,
    depth: usize,
    query: &RayQuery<'_>,
    path: &mut Vec<&'a Node>,
) -> Option<RayHit> {
    path.truncate(depth - 1);
    path.push(node);

    let entry = ray.hit_box(node.bounding_box())?;
    if depth == query.lod {
        return Some(RayHit { point: entry, depth });
    }

    let inner = match node {
        Node::Sparse(leaf) => {
            let point = closest_voxel_hit(leaf.voxels.iter().copied(), ray, query.grid)?;
            return Some(RayHit { point, depth });
        }
        Node::Dense(leaf) => {
            // The ray has to find the unit cell it actually enters
            let point = closest_voxel_hit(query.grid.voxels_in(&leaf.bbox), ray, query.grid)?;
            return Some(RayHit { point, depth });
        }
        Node::Inner(inner) => inner,
    };

    // Only descending is capped; leaves always test their voxels
    if depth >= query.max_depth {
        log::warn!("Ray query reached depth cap {}, reporting box entry", query.max_depth);
        return Some(RayHit { point: entry, depth });
    }

    // Entry point plus up to three plane crossings, tagged with the axis
    // crossed until converted to subspace indices below
    let mut crossings = [(0usize, Vec3::ZERO); 4];
    crossings[0] = (entry_subspace(inner.center, entry, ray.direction), entry);
    let mut count = 1;
    for axis in 0..3 {
        if let Some(p) = ray.hit_plane(inner.center, axis) {
            if inner.bbox.strictly_contains_point(p) {
                crossings[count] = (axis, p);
                count += 1;
            }
        }
    }

    // Stable, so equally distant crossings keep axis order
    crossings[1..count].sort_by(|a, b| {
        abs_metric(ray.origin, a.1).total_cmp(&abs_metric(ray.origin, b.1))
    });
    for i in 1..count {
        crossings[i].0 = (1 << crossings[i].0) ^ crossings[i - 1].0;
    }

    for &(idx, p) in &crossings[..count] {
        if let Some(child) = &inner.children[idx] {
            if let Some(hit) = ray_node(child, &ray.from_point(p), depth + 1, query, path) {
                return Some(hit);
            }
        }
    }
    None
}

/// Subspace the ray is in right after `entry`.
///
/// A coordinate lying exactly on a dividing plane is assigned to the side
/// the ray moves towards.
fn entry_subspace(center: Point, entry: Point, direction: Vec3) -> usize {
    let mut idx = subspace_index(center, entry);
    for axis in 0..3 {
        if entry[axis] == center[axis] && direction[axis] < 0.0 {
            idx &= !(1 << axis);
        }
    }
    idx
}

fn closest_voxel_hit(voxels: impl Iterator<Item = Point>, ray: &Ray, grid: &VoxelGrid) -> Option<Point> {
    let hits: Vec<Point> = voxels
        .filter_map(|v| ray.hit_box(&grid.voxel_box(v)))
        .collect();
    closest_in_set(&hits, abs_metric, ray.origin)
}

/// True if any voxel of the subtree overlaps the solid ball
pub fn ball_collide(slot: &Slot, center: Point, radius: f32, grid: &VoxelGrid) -> bool {
    let Some(node) = slot else {
        return false;
    };
    if !node.bounding_box().intersects_ball(center, radius) {
        return false;
    }
    match node {
        Node::Sparse(leaf) => leaf
            .voxels
            .iter()
            .any(|v| grid.voxel_box(*v).intersects_ball(center, radius)),
        // Fully occupied, so touching the box means touching a voxel
        Node::Dense(_) => true,
        Node::Inner(inner) => inner
            .children
            .iter()
            .any(|child| ball_collide(child, center, radius, grid)),
    }
}

/// Nearest voxel hit found by testing every voxel
#[cfg(test)]
pub(crate) fn brute_force_hit(voxels: &[Point], ray: &Ray, grid: &VoxelGrid) -> Option<Point> {
    closest_voxel_hit(voxels.iter().copied(), ray, grid)
}
