//! Raw volumetric scan reader
//!
//! A raw file is a headerless block of `dim.x * dim.y * dim.z` unsigned
//! little-endian samples, x outermost and z innermost. Every sample above
//! a threshold becomes one voxel.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::core::types::{Point, Result, Vec3};
use crate::core::Error;
use crate::voxel::grid::VoxelGrid;
use crate::voxel::tree::VoxTree;

/// Layout of a raw dataset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawFormat {
    /// Samples along each axis
    pub dim: [u32; 3],
    /// Bytes per sample, 1 to 4
    pub sample_size: u32,
    /// Samples strictly above this value are solid
    pub threshold: u32,
}

impl RawFormat {
    pub fn new(dim: [u32; 3], sample_size: u32, threshold: u32) -> Self {
        Self { dim, sample_size, threshold }
    }

    /// Number of samples in the dataset
    pub fn samples(&self) -> u64 {
        self.dim.iter().map(|d| *d as u64).product()
    }

    fn validate(&self) -> Result<()> {
        if !(1..=4).contains(&self.sample_size) {
            return Err(Error::Dataset(format!(
                "sample size must be 1 to 4 bytes, got {}",
                self.sample_size
            )));
        }
        Ok(())
    }
}

/// Read the solid voxels of a raw dataset as aligned, distinct points
pub fn read_raw_points(path: impl AsRef<Path>, format: &RawFormat, grid: &VoxelGrid) -> Result<Vec<Point>> {
    format.validate()?;
    let path = path.as_ref();
    let file = File::open(path)?;

    let expected = format.samples() * format.sample_size as u64;
    let actual = file.metadata()?.len();
    if actual != expected {
        return Err(Error::DatasetSize { expected, actual });
    }

    let mut reader = BufReader::new(file);
    let mut sample = [0u8; 4];
    let sample_bytes = format.sample_size as usize;
    let [nx, ny, nz] = format.dim;
    let mut points = Vec::new();

    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                reader.read_exact(&mut sample[..sample_bytes])?;
                if u32::from_le_bytes(sample) > format.threshold {
                    let index = Vec3::new(i as f32, j as f32, k as f32);
                    points.push(grid.align_floor(index * grid.size()));
                }
            }
        }
    }

    log::info!(
        "Read {} solid voxels out of {} samples from {}",
        points.len(),
        format.samples(),
        path.display()
    );
    Ok(points)
}

/// Read a raw dataset and build a tree from its solid voxels
pub fn read_raw(path: impl AsRef<Path>, format: &RawFormat, grid: VoxelGrid) -> Result<VoxTree> {
    let mut points = read_raw_points(path, format, &grid)?;
    Ok(VoxTree::build(grid, &mut points))
}
