//! Thread-safe handle to a block grid cache
//!
//! Every call holds one lock for its whole duration, so an eviction and the
//! insert that follows it are atomic with respect to other callers. Blocks
//! are returned by value (cloned), since a borrow can't outlive the lock.

use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

use glam::UVec3;

use super::block_cache::{BlockGridCache, CacheStats};
use super::factory::BlockFactory;
use crate::core::error::Result;

/// Cloneable, lock-guarded block grid cache
pub struct SharedBlockGridCache<K, B, F> {
    inner: Arc<Mutex<BlockGridCache<K, B, F>>>,
}

impl<K, B, F> Clone for SharedBlockGridCache<K, B, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, B, F> SharedBlockGridCache<K, B, F>
where
    K: Eq + Hash + Clone,
    B: Clone,
    F: BlockFactory<B>,
{
    /// Wrap an existing cache
    pub fn new(cache: BlockGridCache<K, B, F>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// See [`BlockGridCache::contains`]
    pub fn contains(&self, key: &K) -> bool {
        self.lock().contains(key)
    }

    /// See [`BlockGridCache::get`]
    pub fn get(&self, key: &K) -> Option<B> {
        self.lock().get(key).cloned()
    }

    /// See [`BlockGridCache::add`]
    pub fn add(&self, key: K) -> Result<B> {
        self.lock().add(key).cloned()
    }

    /// Add `key`, returning its block and the evicted key, if any
    pub fn admit(&self, key: K) -> Result<(B, Option<K>)> {
        let mut cache = self.lock();
        let admission = cache.admit(key)?;
        Ok((admission.block.clone(), admission.evicted))
    }

    /// Block for `key`, adding the key first if it isn't cached
    ///
    /// Returns the block and whether it was already bound to `key`. The
    /// lookup and the add happen under one lock.
    pub fn get_or_add(&self, key: K) -> Result<(B, bool)> {
        let mut cache = self.lock();
        if let Some(block) = cache.get(&key) {
            return Ok((block.clone(), true));
        }
        Ok((cache.add(key)?.clone(), false))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    pub fn grid_size(&self) -> UVec3 {
        self.lock().grid_size()
    }

    pub fn block_size(&self) -> UVec3 {
        self.lock().block_size()
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    pub fn summary(&self) -> String {
        self.lock().summary()
    }

    fn lock(&self) -> MutexGuard<'_, BlockGridCache<K, B, F>> {
        // no operation leaves the cache half-updated when it panics
        self.inner.lock().unwrap_or_else(|poisoned| {
            log::warn!("Block grid cache lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }
}
