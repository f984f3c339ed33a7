//! Atlas configuration
//!
//! Stored as JSON for easy inspection and hand editing:
//!
//! ```json
//! {
//!   "block_size": [32, 32, 32],
//!   "bytes_per_element": 2,
//!   "memory_budget_mb": 256,
//!   "grid_size": null
//! }
//! ```

use std::fs;
use std::hash::Hash;
use std::path::Path;

use glam::UVec3;
use serde::{Deserialize, Serialize};

use crate::cache::{BlockFactory, BlockGridCache, find_suitable_grid_size};
use crate::core::error::Result;

/// Configuration of a texture atlas backed by a block grid cache
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Voxel extents of one block
    pub block_size: [u32; 3],
    /// Bytes per texel (e.g. 2 for 16-bit intensities)
    pub bytes_per_element: u32,
    /// Texture memory budget in megabytes
    pub memory_budget_mb: u32,
    /// Explicit grid size in blocks; derived from the budget when absent
    pub grid_size: Option<[u32; 3]>,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            block_size: [32, 32, 32],
            bytes_per_element: 2,
            memory_budget_mb: 256,
            grid_size: None,
        }
    }
}

impl AtlasConfig {
    /// Parse from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::debug!("Loaded atlas config from {}", path.display());
        Ok(config)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn block_size(&self) -> UVec3 {
        UVec3::from_array(self.block_size)
    }

    /// Grid size to use: the explicit one, else the largest that fits the budget
    pub fn resolve_grid_size(&self) -> Result<UVec3> {
        match self.grid_size {
            Some(grid) => Ok(UVec3::from_array(grid)),
            None => find_suitable_grid_size(
                self.block_size(),
                self.bytes_per_element,
                self.memory_budget_mb,
            ),
        }
    }

    /// Texture bytes needed for a grid of this config's blocks
    pub fn texture_bytes(&self, grid_size: UVec3) -> u64 {
        let [bx, by, bz] = self.block_size;
        (grid_size.x as u64 * bx as u64)
            .saturating_mul(grid_size.y as u64 * by as u64)
            .saturating_mul(grid_size.z as u64 * bz as u64)
            .saturating_mul(self.bytes_per_element as u64)
    }

    /// Budget in bytes
    pub fn budget_bytes(&self) -> u64 {
        self.memory_budget_mb as u64 * 1024 * 1024
    }

    /// Build a cache for this configuration
    pub fn build_cache<K, B, F>(&self, factory: F) -> Result<BlockGridCache<K, B, F>>
    where
        K: Eq + Hash + Clone,
        F: BlockFactory<B>,
    {
        let grid_size = self.resolve_grid_size()?;
        if self.grid_size.is_some() && self.texture_bytes(grid_size) > self.budget_bytes() {
            log::warn!(
                "Explicit grid {} needs {} bytes, over the {}MB budget",
                grid_size,
                self.texture_bytes(grid_size),
                self.memory_budget_mb
            );
        }
        BlockGridCache::new(self.block_size(), grid_size, factory)
    }
}
