//! Texture atlas blocks and chunk keys
//!
//! `AtlasBlock` is the usual block type when the grid backs a 3D texture:
//! it records where in the texture the chunk bound to it must be uploaded.
//! `BlockKey` identifies a chunk of a multi-resolution volume.

use glam::{IVec3, UVec3};

use super::factory::BlockFactory;
use crate::math::texel_offset;

/// A block slot inside a 3D texture atlas
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AtlasBlock {
    /// Position in the grid, in block units
    pub grid_pos: UVec3,
    /// Voxel offset of the block's first texel in the atlas texture
    pub texel_offset: UVec3,
    /// Voxel extents of the block
    pub extent: UVec3,
}

impl AtlasBlock {
    /// Exclusive upper texel corner
    pub fn texel_end(&self) -> UVec3 {
        self.texel_offset + self.extent
    }
}

/// Factory producing `AtlasBlock`s for a fixed block size
#[derive(Clone, Copy, Debug)]
pub struct AtlasBlockFactory {
    block_size: UVec3,
}

impl AtlasBlockFactory {
    pub fn new(block_size: UVec3) -> Self {
        Self { block_size }
    }

    pub fn block_size(&self) -> UVec3 {
        self.block_size
    }
}

impl BlockFactory<AtlasBlock> for AtlasBlockFactory {
    fn create_block(&mut self, pos: UVec3) -> AtlasBlock {
        AtlasBlock {
            grid_pos: pos,
            texel_offset: texel_offset(pos, self.block_size),
            extent: self.block_size,
        }
    }
}

/// Key of a volume chunk: resolution level plus cell coordinate at that level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockKey {
    /// Resolution level (0 = full resolution)
    pub level: u32,
    /// Cell coordinate in the level's chunk grid
    pub cell: IVec3,
}

impl BlockKey {
    pub fn new(level: u32, cell: IVec3) -> Self {
        Self { level, cell }
    }

    /// Key of the chunk one level coarser that covers this one
    pub fn parent(&self) -> Self {
        Self {
            level: self.level + 1,
            cell: self.cell.div_euclid(IVec3::splat(2)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_computes_texel_offset() {
        let mut factory = AtlasBlockFactory::new(UVec3::new(32, 32, 16));
        let block = factory.create_block(UVec3::new(2, 0, 3));
        assert_eq!(block.grid_pos, UVec3::new(2, 0, 3));
        assert_eq!(block.texel_offset, UVec3::new(64, 0, 48));
        assert_eq!(block.texel_end(), UVec3::new(96, 32, 64));
    }

    #[test]
    fn test_adjacent_blocks_do_not_overlap() {
        let mut factory = AtlasBlockFactory::new(UVec3::splat(8));
        let a = factory.create_block(UVec3::new(0, 0, 0));
        let b = factory.create_block(UVec3::new(1, 0, 0));
        assert_eq!(a.texel_end().x, b.texel_offset.x);
    }

    #[test]
    fn test_key_parent() {
        let key = BlockKey::new(0, IVec3::new(5, -3, 4));
        let parent = key.parent();
        assert_eq!(parent.level, 1);
        assert_eq!(parent.cell, IVec3::new(2, -2, 2));
    }
}
