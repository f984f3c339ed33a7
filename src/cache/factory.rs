//! Block factory capability

use glam::UVec3;

/// Creates the block occupying a grid position
///
/// Called once per grid position, the first time the cache needs that slot.
/// Blocks are never destroyed on eviction, so a factory runs at most
/// `capacity` times over the lifetime of a cache. Implementations must not
/// call back into the cache that owns them.
pub trait BlockFactory<B> {
    /// Create the block for `pos`
    fn create_block(&mut self, pos: UVec3) -> B;
}

impl<B, F> BlockFactory<B> for F
where
    F: FnMut(UVec3) -> B,
{
    fn create_block(&mut self, pos: UVec3) -> B {
        self(pos)
    }
}
