//! Blockgrid - LRU block cache for 3D texture atlases
//!
//! Maps keys identifying chunks of volumetric data to fixed-size blocks of a
//! pre-allocated 3D grid. When the grid is full, the least recently used key
//! gives up its block to the newcomer.

pub mod cache;
pub mod core;
pub mod math;

pub use crate::cache::{
    Admission, AtlasBlock, AtlasBlockFactory, BlockFactory, BlockGridCache, BlockKey, CacheStats,
    SharedBlockGridCache, find_suitable_grid_size,
};
pub use crate::core::{AtlasConfig, Error, Result};
