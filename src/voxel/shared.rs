//! Tree shared between one writer and many readers
//!
//! Readers work on an `Arc` snapshot and never see a half-edited tree.
//! Writers serialize on a separate mutex so a background rebuild cannot
//! lose edits made while it was running.

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use rayon::prelude::*;

use crate::core::types::{Point, Vec3};
use crate::math::Ray;
use crate::voxel::tree::{RayHit, VoxTree};

pub struct SharedTree {
    current: RwLock<Arc<VoxTree>>,
    writer: Mutex<()>,
}

impl SharedTree {
    pub fn new(tree: VoxTree) -> Self {
        Self {
            current: RwLock::new(Arc::new(tree)),
            writer: Mutex::new(()),
        }
    }

    /// The current tree. Later edits do not affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<VoxTree> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn voxel_count(&self) -> usize {
        self.snapshot().voxel_count()
    }

    pub fn ray_intersect(&self, origin: Point, direction: Vec3) -> Option<RayHit> {
        self.snapshot().ray_intersect(origin, direction)
    }

    pub fn ball_collide(&self, center: Point, radius: f32) -> bool {
        self.snapshot().ball_collide(center, radius)
    }

    /// Answer a batch of rays in parallel against one snapshot
    pub fn cast_rays(&self, rays: &[Ray]) -> Vec<Option<RayHit>> {
        let tree = self.snapshot();
        rays.par_iter()
            .map(|ray| tree.ray_intersect(ray.origin, ray.direction))
            .collect()
    }

    pub fn insert(&self, voxel: Point) -> bool {
        self.edit(|tree| tree.insert(voxel))
    }

    pub fn delete(&self, voxel: Point) -> bool {
        self.edit(|tree| tree.delete(voxel))
    }

    fn edit(&self, op: impl FnOnce(&mut VoxTree) -> bool) -> bool {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        // Copies the tree only while readers still hold the old snapshot
        op(Arc::make_mut(&mut current))
    }

    /// Rebuild from a snapshot and swap the result in.
    ///
    /// Readers are not blocked while the new tree is built. The old tree
    /// is freed once the last snapshot of it is dropped.
    pub fn rebuild(&self) {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let start = Instant::now();
        let rebuilt = Arc::new(self.snapshot().rebuild());
        let count = rebuilt.voxel_count();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = rebuilt;
        log::debug!("Swapped in rebuilt tree of {} voxels after {:.2?}", count, start.elapsed());
    }

    /// Run [`SharedTree::rebuild`] on the rayon pool.
    ///
    /// The receiver gets the voxel count of the new tree once it is in place.
    pub fn spawn_rebuild(self: &Arc<Self>) -> Receiver<usize> {
        let (tx, rx) = mpsc::channel();
        let shared = Arc::clone(self);
        rayon::spawn(move || {
            shared.rebuild();
            // Nobody waiting is fine
            let _ = tx.send(shared.voxel_count());
        });
        rx
    }
}

impl From<VoxTree> for SharedTree {
    fn from(tree: VoxTree) -> Self {
        Self::new(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::grid::VoxelGrid;
    use crate::voxel::tree::Node;

    fn line_tree(n: usize) -> VoxTree {
        let voxels = (0..n).map(|i| Vec3::new(i as f32 * 2.0, 0.0, 0.0)).collect();
        VoxTree::from_voxels(VoxelGrid::default(), voxels)
    }

    #[test]
    fn test_snapshot_is_isolated_from_edits() {
        let shared = SharedTree::new(line_tree(10));
        let before = shared.snapshot();
        assert!(shared.insert(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(before.voxel_count(), 10);
        assert_eq!(shared.voxel_count(), 11);
        assert!(!shared.delete(Vec3::new(1.0, 5.0, 0.0)));
    }

    #[test]
    fn test_cast_rays_matches_single_queries() {
        let shared = SharedTree::new(line_tree(50));
        let rays: Vec<Ray> = (0..100)
            .map(|i| Ray::new(Vec3::new(i as f32 + 0.5, 10.0, 0.5), Vec3::NEG_Y))
            .collect();
        let hits = shared.cast_rays(&rays);
        assert_eq!(hits.len(), rays.len());
        for (ray, hit) in rays.iter().zip(&hits) {
            assert_eq!(*hit, shared.ray_intersect(ray.origin, ray.direction));
        }
        assert!(hits[0].is_some());
        assert!(hits[1].is_none());
        assert!(hits[99].is_none());
    }

    #[test]
    fn test_rebuild_swaps_root() {
        let shared = SharedTree::new(VoxTree::default());
        for x in 0..2 {
            for y in 0..2 {
                for z in 0..2 {
                    shared.insert(Vec3::new(x as f32, y as f32, z as f32));
                }
            }
        }
        let old = shared.snapshot();
        assert!(matches!(old.root(), Some(Node::Sparse(_))));
        shared.rebuild();
        assert!(matches!(shared.snapshot().root(), Some(Node::Dense(_))));
        assert!(matches!(old.root(), Some(Node::Sparse(_))));
    }

    #[test]
    fn test_spawn_rebuild() {
        let shared = Arc::new(SharedTree::new(line_tree(30)));
        let done = shared.spawn_rebuild();
        assert_eq!(done.recv().unwrap(), 30);
        assert!(shared.ball_collide(Vec3::new(58.5, 0.5, 0.5), 0.1));
    }

    #[test]
    fn test_readers_during_writes() {
        let shared = SharedTree::new(VoxTree::default());
        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 0..200 {
                    shared.insert(Vec3::new(i as f32, 0.0, 0.0));
                }
            });
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..50 {
                        let tree = shared.snapshot();
                        assert_eq!(tree.check_invariants(), Ok(tree.voxel_count()));
                    }
                });
            }
        });
        assert_eq!(shared.voxel_count(), 200);
    }
}
