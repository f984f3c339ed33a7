//! Block grid caching for 3D texture atlases
//!
//! Key concepts:
//! - Block Grid: fixed 3D grid of equally sized blocks backing a texture
//! - LRU Cache: keys are bound to blocks; the least recently used key loses
//!   its block when the grid is full
//! - Block Factory: creates the block for a grid position on first use only
//! - Grid Sizing: picks a grid that fits a memory budget

pub mod atlas;
pub mod block_cache;
pub mod factory;
pub mod recency;
pub mod shared;
pub mod sizing;

pub use atlas::{AtlasBlock, AtlasBlockFactory, BlockKey};
pub use block_cache::{Admission, BlockGridCache, CacheStats};
pub use factory::BlockFactory;
pub use recency::RecencyList;
pub use shared::SharedBlockGridCache;
pub use sizing::find_suitable_grid_size;
