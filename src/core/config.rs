//! Tree configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::{Result, Vec3};
use crate::core::Error;
use crate::voxel::grid::VoxelGrid;

/// Default recursion cap for ray queries
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default number of path levels a local ray search may climb
pub const DEFAULT_MAX_LOCAL_DEPTH: usize = 3;

/// Configuration shared by a tree and the queries run against it.
///
/// The voxel size must be fixed before any tree is built from this config.
/// Changing it afterwards does not re-grid existing trees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Size of one voxel on each axis
    pub voxel_size: [f32; 3],
    /// Level of detail: ray queries stop at this depth and report the
    /// bounding box entry point. 0 means full precision.
    pub lod: u32,
    /// Maximum recursion depth of ray queries
    pub max_depth: usize,
    /// How many levels of a previous path a local ray search may climb
    pub max_local_depth: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            voxel_size: [1.0, 1.0, 1.0],
            lod: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            max_local_depth: DEFAULT_MAX_LOCAL_DEPTH,
        }
    }
}

impl TreeConfig {
    /// Parse and validate a config from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TreeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check that the values describe a usable grid and query setup
    pub fn validate(&self) -> Result<()> {
        if self.voxel_size.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(Error::Config(format!(
                "voxel size must be positive and finite, got {:?}",
                self.voxel_size
            )));
        }
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be at least 1".to_string()));
        }
        Ok(())
    }

    /// The voxel grid described by this config
    pub fn grid(&self) -> VoxelGrid {
        VoxelGrid::new(Vec3::from(self.voxel_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = TreeConfig::default();
        assert_eq!(config.voxel_size, [1.0, 1.0, 1.0]);
        assert_eq!(config.lod, 0);
        assert_eq!(config.grid().size(), Vec3::ONE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TreeConfig::from_json(r#"{ "voxel_size": [0.5, 1.0, 2.0] }"#).unwrap();
        assert_eq!(config.voxel_size, [0.5, 1.0, 2.0]);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_local_depth, DEFAULT_MAX_LOCAL_DEPTH);
    }

    #[test]
    fn test_rejects_bad_voxel_size() {
        let err = TreeConfig::from_json(r#"{ "voxel_size": [0.0, 1.0, 1.0] }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_zero_depth() {
        let err = TreeConfig::from_json(r#"{ "max_depth": 0 }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = TreeConfig::from_json("{ voxel_size").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let path = temp_dir.path().join("tree.json");

        let config = TreeConfig { lod: 4, ..Default::default() };
        config.save(&path).expect("save failed");

        let loaded = TreeConfig::load(&path).expect("load failed");
        assert_eq!(loaded, config);
    }
}
