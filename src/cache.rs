//! Sparse block cache.
//!
//! Blocks are keyed by index (`offset / block_size`). Every entry holds a full
//! block except the final block of the resource, which may be shorter. There is
//! no eviction: entries accumulate for the lifetime of the stream and are only
//! dropped wholesale by [`BlockCache::clear`].

use std::collections::HashMap;
use std::num::NonZeroU64;

#[derive(Debug)]
pub struct BlockCache {
    block_size: Option<NonZeroU64>,
    entries: HashMap<u64, Vec<u8>>,
}

impl BlockCache {
    /// `None` disables caching; the planner then fetches every read directly.
    pub fn new(block_size: Option<NonZeroU64>) -> Self {
        Self {
            block_size,
            entries: HashMap::new(),
        }
    }

    pub fn block_size(&self) -> Option<NonZeroU64> {
        self.block_size
    }

    pub fn is_enabled(&self) -> bool {
        self.block_size.is_some()
    }

    pub fn has(&self, index: u64) -> bool {
        self.entries.contains_key(&index)
    }

    /// Cached bytes of block `index`.
    ///
    /// # Panics
    ///
    /// Panics if the block is not cached. Callers check [`has`](Self::has) or
    /// have just inserted the block.
    pub fn get(&self, index: u64) -> &[u8] {
        &self.entries[&index]
    }

    pub fn put(&mut self, index: u64, data: Vec<u8>) {
        debug_assert!(
            self.block_size
                .is_some_and(|bs| data.len() as u64 <= bs.get()),
            "block {index} larger than block size"
        );
        self.entries.insert(index, data);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached blocks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cached_bytes(&self) -> u64 {
        self.entries.values().map(|b| b.len() as u64).sum()
    }
}
