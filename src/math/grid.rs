//! Grid coordinate math for block grids
//!
//! Linear indices map to 3D positions with x varying fastest, then y, then z:
//! `index = x + gx * (y + gy * z)`. Slot `n` of a block grid always lives at
//! `index_to_position(n, grid)`.

use glam::UVec3;

/// Number of elements in an extent (product of the three axes), saturating at `u64::MAX`
pub fn num_elements(extent: UVec3) -> u64 {
    (extent.x as u64)
        .saturating_mul(extent.y as u64)
        .saturating_mul(extent.z as u64)
}

/// Number of elements in an extent, or `None` if it doesn't fit a `usize`
pub fn checked_num_elements(extent: UVec3) -> Option<usize> {
    (extent.x as usize)
        .checked_mul(extent.y as usize)?
        .checked_mul(extent.z as usize)
}

/// Convert a linear index into a grid position (x fastest)
///
/// `index` must be below `num_elements(grid)`.
pub fn index_to_position(index: usize, grid: UVec3) -> UVec3 {
    debug_assert!((index as u64) < num_elements(grid), "index {} outside grid {}", index, grid);
    let gx = grid.x as usize;
    let gy = grid.y as usize;
    let x = index % gx;
    let rest = index / gx;
    let y = rest % gy;
    let z = rest / gy;
    UVec3::new(x as u32, y as u32, z as u32)
}

/// Convert a grid position back into its linear index
pub fn position_to_index(pos: UVec3, grid: UVec3) -> usize {
    debug_assert!(pos.cmplt(grid).all(), "position {} outside grid {}", pos, grid);
    pos.x as usize + grid.x as usize * (pos.y as usize + grid.y as usize * pos.z as usize)
}

/// Voxel offset of a block within the atlas texture
pub fn texel_offset(pos: UVec3, block_size: UVec3) -> UVec3 {
    pos * block_size
}
