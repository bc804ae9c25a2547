//! LRU Tracker Module
//!
//! Access-order tracking used by the in-memory store to stay within its
//! entry budget.

use std::collections::VecDeque;

use crate::cache::CacheKey;

// == LRU Tracker ==
/// Tracks access order of region keys.
///
/// Front = most recently used, back = least recently used.
#[derive(Debug, Default)]
pub struct LruTracker {
    order: VecDeque<CacheKey>,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used.
    pub fn touch(&mut self, key: &CacheKey) {
        self.remove(key);
        self.order.push_front(key.clone());
    }

    // == Remove ==
    pub fn remove(&mut self, key: &CacheKey) {
        self.order.retain(|k| k != key);
    }

    // == Evict ==
    /// Removes and returns the least recently used key accepted by
    /// `evictable`. Keys that are refused keep their position.
    pub fn evict_oldest_where<F>(&mut self, mut evictable: F) -> Option<CacheKey>
    where
        F: FnMut(&CacheKey) -> bool,
    {
        let position = self.order.iter().rposition(|k| evictable(k))?;
        self.order.remove(position)
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
