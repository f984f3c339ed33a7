//! Block Grid Cache - LRU assignment of keys to slots of a 3D block grid
//!
//! The grid has `capacity = gx * gy * gz` slots. The first `capacity` keys
//! added each get a fresh slot, allocated in linear order (x fastest) and
//! populated by the block factory. Once every slot is in use, adding a key
//! evicts the least recently used key and rebinds its block, unchanged, to
//! the new key. Blocks are never destroyed or re-created, so the factory runs
//! at most `capacity` times.
//!
//! Slots live in an arena whose index equals the linear grid index of the
//! slot's position. A hash index maps keys to slots and an index-linked list
//! keeps recency order, so lookups, touches and evictions are all O(1).

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use glam::UVec3;

use super::factory::BlockFactory;
use super::recency::RecencyList;
use crate::core::error::{Error, Result};
use crate::math::{checked_num_elements, index_to_position, num_elements};

/// Upper bound on slots reserved up front; larger grids grow on demand
const MAX_PREALLOCATED_SLOTS: usize = 1 << 16;

/// One grid slot and the key currently bound to it
struct Slot<K, B> {
    key: K,
    block: B,
    pos: UVec3,
}

/// Access counters for a cache
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// `get`/`get_mut` calls that found their key
    pub hits: u64,
    /// `get`/`get_mut` calls that didn't
    pub misses: u64,
    /// Keys dropped to make room for new ones
    pub evictions: u64,
    /// Blocks produced by the factory (lifetime total, never reset)
    pub blocks_created: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit (1.0 when there were none)
    pub fn hit_rate(&self) -> f32 {
        let requests = self.hits + self.misses;
        if requests == 0 {
            1.0
        } else {
            self.hits as f32 / requests as f32
        }
    }
}

/// Result of adding a key
#[derive(Debug)]
pub struct Admission<'a, K, B> {
    /// Block now bound to the added key
    pub block: &'a B,
    /// Grid position of that block
    pub position: UVec3,
    /// Key that lost the block, if the grid was full
    pub evicted: Option<K>,
}

/// LRU cache binding keys to blocks on a fixed 3D grid
pub struct BlockGridCache<K, B, F> {
    factory: F,
    block_size: UVec3,
    grid_size: UVec3,
    capacity: usize,
    /// Slot arena; index == linear grid index
    slots: Vec<Slot<K, B>>,
    /// key -> slot index
    index: HashMap<K, u32>,
    recency: RecencyList,
    stats: CacheStats,
}

impl<K, B, F> BlockGridCache<K, B, F>
where
    K: Eq + Hash + Clone,
    F: BlockFactory<B>,
{
    /// Create a cache over a `grid_size` grid of `block_size` blocks
    ///
    /// Fails if any block axis is zero, if the grid has no slots, or if the
    /// grid or its texture footprint can't be addressed.
    pub fn new(block_size: UVec3, grid_size: UVec3, factory: F) -> Result<Self> {
        if block_size.cmpeq(UVec3::ZERO).any() {
            return Err(Error::InvalidArgument(format!(
                "block size {} has a zero axis",
                block_size
            )));
        }

        let capacity = checked_num_elements(grid_size)
            .filter(|&c| c <= u32::MAX as usize)
            .ok_or(Error::CapacityOverflow { grid_size })?;
        if capacity == 0 {
            return Err(Error::ZeroCapacity { grid_size });
        }

        let texture_fits = grid_size
            .to_array()
            .iter()
            .zip(block_size.to_array())
            .all(|(&g, b)| g.checked_mul(b).is_some());
        if !texture_fits {
            return Err(Error::InvalidArgument(format!(
                "texture size for grid {} and block size {} overflows",
                grid_size, block_size
            )));
        }

        let reserved = capacity.min(MAX_PREALLOCATED_SLOTS);
        let cache = Self {
            factory,
            block_size,
            grid_size,
            capacity,
            slots: Vec::with_capacity(reserved),
            index: HashMap::with_capacity(reserved),
            recency: RecencyList::with_capacity(reserved),
            stats: CacheStats::default(),
        };

        log::info!("Created block grid cache: {} ({} blocks)", cache, capacity);
        Ok(cache)
    }

    /// Whether `key` currently occupies a slot. Doesn't affect recency.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Block bound to `key`, marking `key` most recently used
    pub fn get(&mut self, key: &K) -> Option<&B> {
        let idx = self.touch(key)?;
        Some(&self.slots[idx as usize].block)
    }

    /// Mutable block bound to `key`, marking `key` most recently used
    pub fn get_mut(&mut self, key: &K) -> Option<&mut B> {
        let idx = self.touch(key)?;
        Some(&mut self.slots[idx as usize].block)
    }

    /// Block bound to `key` without touching recency or stats
    pub fn peek(&self, key: &K) -> Option<&B> {
        let &idx = self.index.get(key)?;
        Some(&self.slots[idx as usize].block)
    }

    /// Grid position of the slot bound to `key`, without touching recency
    pub fn position_of(&self, key: &K) -> Option<UVec3> {
        let &idx = self.index.get(key)?;
        Some(self.slots[idx as usize].pos)
    }

    /// Add a key that is not yet cached and return its block
    ///
    /// While the grid has unused slots the next one (in linear order) is
    /// created through the factory. Once the grid is full the least recently
    /// used key is evicted and its block is handed to `key` as is.
    ///
    /// Adding a key that is already present fails with
    /// [`Error::DuplicateKey`] and leaves the cache untouched.
    pub fn add(&mut self, key: K) -> Result<&B> {
        self.admit(key).map(|admission| admission.block)
    }

    /// Like [`add`](Self::add), also reporting which key was evicted
    pub fn admit(&mut self, key: K) -> Result<Admission<'_, K, B>> {
        if self.index.contains_key(&key) {
            return Err(Error::DuplicateKey);
        }

        let (idx, evicted) = if self.index.len() < self.capacity {
            (self.allocate_slot(key.clone()), None)
        } else {
            let idx = self
                .recency
                .front()
                .ok_or(Error::ZeroCapacity { grid_size: self.grid_size })?;
            let slot = &mut self.slots[idx as usize];
            let old_key = std::mem::replace(&mut slot.key, key.clone());
            self.index.remove(&old_key);
            self.recency.move_to_back(idx);
            self.stats.evictions += 1;
            log::trace!("Evicted block at {} (slot {})", slot.pos, idx);
            (idx, Some(old_key))
        };

        self.index.insert(key, idx);

        let slot = &self.slots[idx as usize];
        Ok(Admission {
            block: &slot.block,
            position: slot.pos,
            evicted,
        })
    }

    /// Next key to be evicted
    pub fn lru_key(&self) -> Option<&K> {
        let idx = self.recency.front()?;
        Some(&self.slots[idx as usize].key)
    }

    /// Cached `(key, block)` pairs, least recently used first
    pub fn iter(&self) -> impl Iterator<Item = (&K, &B)> + '_ {
        self.recency.iter().map(move |idx| {
            let slot = &self.slots[idx as usize];
            (&slot.key, &slot.block)
        })
    }

    /// Create the block for the next unused slot and bind it to `key`
    fn allocate_slot(&mut self, key: K) -> u32 {
        let idx = self.slots.len();
        let pos = index_to_position(idx, self.grid_size);
        let block = self.factory.create_block(pos);
        self.stats.blocks_created += 1;

        self.slots.push(Slot { key, block, pos });
        let linked = self.recency.push_back();
        debug_assert_eq!(linked as usize, idx);
        log::trace!("Allocated block at {} (slot {})", pos, idx);
        idx as u32
    }

    fn touch(&mut self, key: &K) -> Option<u32> {
        match self.index.get(key) {
            Some(&idx) => {
                self.stats.hits += 1;
                self.recency.move_to_back(idx);
                Some(idx)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }
}

impl<K, B, F> BlockGridCache<K, B, F> {
    /// Extents of the grid, in blocks
    pub fn grid_size(&self) -> UVec3 {
        self.grid_size
    }

    /// Extents of one block, in voxels
    pub fn block_size(&self) -> UVec3 {
        self.block_size
    }

    /// Number of blocks the grid can hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cached keys
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether every slot is bound, i.e. the next add will evict
    pub fn is_full(&self) -> bool {
        self.index.len() >= self.capacity
    }

    /// Extents of the backing texture, in voxels
    pub fn texture_size(&self) -> UVec3 {
        self.grid_size * self.block_size
    }

    /// Number of voxels in the backing texture
    pub fn texture_elements(&self) -> u64 {
        num_elements(self.texture_size())
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Zero hit, miss and eviction counters
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats {
            blocks_created: self.stats.blocks_created,
            ..CacheStats::default()
        };
    }

    /// Human-readable description of the grid layout
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl<K, B, F> fmt::Display for BlockGridCache<K, B, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = self.grid_size;
        let b = self.block_size;
        let t = self.texture_size();
        write!(
            f,
            "gridSize = {} x {} x {}, blockSize = {} x {} x {}, textureSize = {} x {} x {} ({} elements)",
            g.x, g.y, g.z, b.x, b.y, b.z, t.x, t.y, t.z, self.texture_elements()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::rc::Rc;

    /// Block that remembers which factory call produced it
    #[derive(Debug, PartialEq, Eq)]
    struct TestBlock {
        pos: UVec3,
        serial: usize,
    }

    fn counting_cache(
        grid: UVec3,
    ) -> (BlockGridCache<&'static str, TestBlock, impl FnMut(UVec3) -> TestBlock>, Rc<Cell<usize>>) {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let factory = move |pos: UVec3| {
            let serial = counter.get();
            counter.set(serial + 1);
            TestBlock { pos, serial }
        };
        let cache = BlockGridCache::new(UVec3::ONE, grid, factory).unwrap();
        (cache, count)
    }

    fn int_cache(capacity: u32) -> BlockGridCache<u32, UVec3, impl FnMut(UVec3) -> UVec3> {
        BlockGridCache::new(UVec3::splat(4), UVec3::new(capacity, 1, 1), |pos: UVec3| pos).unwrap()
    }

    #[test]
    fn test_concrete_scenario() {
        let (mut cache, _) = counting_cache(UVec3::new(2, 1, 1));
        assert_eq!(cache.capacity(), 2);

        assert_eq!(cache.add("a").unwrap().pos, UVec3::new(0, 0, 0));
        assert_eq!(cache.add("b").unwrap().pos, UVec3::new(1, 0, 0));
        assert!(cache.get(&"a").is_some());

        let admission = cache.admit("c").unwrap();
        assert_eq!(admission.position, UVec3::new(1, 0, 0));
        assert_eq!(admission.block.serial, 1); // b's block, reused
        assert_eq!(admission.evicted, Some("b"));

        assert!(!cache.contains(&"b"));
        assert!(cache.contains(&"a"));
        assert!(cache.contains(&"c"));
    }

    #[test]
    fn test_slots_allocated_in_linear_order() {
        let (mut cache, _) = counting_cache(UVec3::new(2, 2, 2));
        let keys = ["k0", "k1", "k2", "k3", "k4", "k5", "k6", "k7"];
        for (i, key) in keys.iter().enumerate() {
            let pos = cache.add(*key).unwrap().pos;
            assert_eq!(pos, index_to_position(i, UVec3::new(2, 2, 2)));
        }
        assert_eq!(cache.position_of(&"k3"), Some(UVec3::new(1, 1, 0)));
        assert_eq!(cache.position_of(&"k7"), Some(UVec3::new(1, 1, 1)));
    }

    #[test]
    fn test_capacity_bound() {
        let mut cache = int_cache(5);
        for key in 0..50 {
            cache.add(key).unwrap();
            assert!(cache.len() <= cache.capacity());
        }
        assert_eq!(cache.len(), 5);
        assert!(cache.is_full());
    }

    #[test]
    fn test_bijection_between_keys_and_positions() {
        let mut cache = int_cache(4);
        for key in 0..11 {
            cache.add(key).unwrap();
            if key % 3 == 0 {
                cache.get(&(key / 2));
            }

            let positions: HashSet<UVec3> = cache
                .iter()
                .map(|(k, _)| cache.position_of(k).unwrap())
                .collect();
            assert_eq!(positions.len(), cache.len());

            // int_cache blocks are their own position
            for (k, block) in cache.iter() {
                assert_eq!(Some(*block), cache.position_of(k));
            }
        }
    }

    #[test]
    fn test_lru_evicts_first_inserted() {
        let mut cache = int_cache(3);
        for key in 1..=3 {
            cache.add(key).unwrap();
        }
        let admission = cache.admit(4).unwrap();
        assert_eq!(admission.evicted, Some(1));
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
    }

    #[test]
    fn test_get_protects_from_eviction() {
        let mut cache = int_cache(3);
        for key in 1..=3 {
            cache.add(key).unwrap();
        }
        cache.get(&1);
        let admission = cache.admit(4).unwrap();
        assert_eq!(admission.evicted, Some(2));
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
    }

    #[test]
    fn test_get_mut_updates_order() {
        let mut cache = int_cache(2);
        cache.add(1).unwrap();
        cache.add(2).unwrap();
        assert!(cache.get_mut(&1).is_some());
        assert_eq!(cache.admit(3).unwrap().evicted, Some(2));
    }

    #[test]
    fn test_factory_called_once_per_slot() {
        let (mut cache, count) = counting_cache(UVec3::new(3, 2, 1));
        let keys: Vec<&'static str> = vec![
            "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o",
        ];
        for key in &keys {
            cache.add(*key).unwrap();
        }
        assert_eq!(count.get(), 6);
        assert_eq!(cache.stats().blocks_created, 6);
        assert_eq!(cache.stats().evictions, (keys.len() - 6) as u64);
    }

    #[test]
    fn test_repeated_get_returns_same_block() {
        let (mut cache, _) = counting_cache(UVec3::new(3, 1, 1));
        cache.add("a").unwrap();
        cache.add("b").unwrap();
        cache.add("c").unwrap();

        let first = cache.get(&"b").map(|b| b as *const TestBlock);
        for _ in 0..5 {
            let again = cache.get(&"b").map(|b| b as *const TestBlock);
            assert_eq!(first, again);
        }
        assert_eq!(cache.get(&"b").unwrap().serial, 1);

        // only "b" moved; "a" is still next out
        assert_eq!(cache.lru_key(), Some(&"a"));
        assert_eq!(cache.admit("d").unwrap().evicted, Some("a"));
        assert_eq!(cache.lru_key(), Some(&"c"));
    }

    #[test]
    fn test_duplicate_add_fails_without_mutation() {
        let (mut cache, count) = counting_cache(UVec3::new(2, 1, 1));
        cache.add("a").unwrap();
        cache.add("b").unwrap();

        let before: Vec<_> = cache.iter().map(|(k, b)| (*k, b.serial)).collect();
        let err = cache.add("a").unwrap_err();
        assert!(matches!(err, Error::DuplicateKey));

        let after: Vec<_> = cache.iter().map(|(k, b)| (*k, b.serial)).collect();
        assert_eq!(before, after);
        assert_eq!(cache.len(), 2);
        assert_eq!(count.get(), 2);
        // failed add must not count as an access
        assert_eq!(cache.lru_key(), Some(&"a"));
    }

    #[test]
    fn test_contains_and_peek_leave_recency_alone() {
        let mut cache = int_cache(2);
        cache.add(1).unwrap();
        cache.add(2).unwrap();
        assert!(cache.contains(&1));
        assert!(cache.peek(&1).is_some());
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.admit(3).unwrap().evicted, Some(1));
    }

    #[test]
    fn test_miss_is_not_an_error() {
        let mut cache = int_cache(2);
        assert!(cache.get(&7).is_none());
        assert!(cache.get_mut(&7).is_none());
        assert!(cache.peek(&7).is_none());
        assert!(!cache.contains(&7));
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_stats_and_reset() {
        let mut cache = int_cache(1);
        cache.add(1).unwrap();
        cache.get(&1);
        cache.get(&2);
        cache.add(2).unwrap();

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.hit_rate(), 0.5);

        cache.reset_stats();
        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.blocks_created, 1);
        assert_eq!(stats.hit_rate(), 1.0);
    }

    #[test]
    fn test_iter_is_lru_first() {
        let mut cache = int_cache(3);
        cache.add(10).unwrap();
        cache.add(20).unwrap();
        cache.add(30).unwrap();
        cache.get(&10);
        let keys: Vec<u32> = cache.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![20, 30, 10]);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let result = BlockGridCache::<u32, UVec3, _>::new(UVec3::ONE, UVec3::new(4, 0, 4), |p: UVec3| p);
        assert!(matches!(result, Err(Error::ZeroCapacity { .. })));
    }

    #[test]
    fn test_rejects_zero_block_axis() {
        let result = BlockGridCache::<u32, UVec3, _>::new(UVec3::new(8, 0, 8), UVec3::ONE, |p: UVec3| p);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_unaddressable_grid() {
        let result =
            BlockGridCache::<u32, UVec3, _>::new(UVec3::ONE, UVec3::splat(u32::MAX), |p: UVec3| p);
        assert!(matches!(result, Err(Error::CapacityOverflow { .. })));
    }

    #[test]
    fn test_accessors_and_summary() {
        let cache: BlockGridCache<u32, UVec3, _> =
            BlockGridCache::new(UVec3::new(32, 32, 16), UVec3::new(4, 2, 3), |p: UVec3| p).unwrap();
        assert_eq!(cache.capacity(), 24);
        assert_eq!(cache.grid_size(), UVec3::new(4, 2, 3));
        assert_eq!(cache.block_size(), UVec3::new(32, 32, 16));
        assert_eq!(cache.texture_size(), UVec3::new(128, 64, 48));
        assert_eq!(cache.texture_elements(), 128 * 64 * 48);
        assert!(cache.is_empty());

        let summary = cache.summary();
        assert!(summary.contains("gridSize = 4 x 2 x 3"));
        assert!(summary.contains("blockSize = 32 x 32 x 16"));
        assert!(summary.contains("(393216 elements)"));
    }
}
