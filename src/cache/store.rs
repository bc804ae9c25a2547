//! Cache Store Module
//!
//! The backing-store contract a region needs, and an in-memory store that
//! satisfies it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{
    Applied, CacheKey, CacheStats, Clock, Entry, EntryProcessor, LruTracker, Mutation, Outcome,
    SystemClock,
};
use crate::config::RegionConfig;
use crate::error::{CacheError, Result};

// == Region Cache Contract ==
/// Key-value operations of one region's backing store.
///
/// Every call is a single attempt. `compute` is the only conditional write:
/// the processor runs while the store holds the key exclusively, so no other
/// caller can interleave between its read and its write.
#[async_trait]
pub trait RegionCache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Region this store serves.
    fn name(&self) -> &str;

    /// Timestamp source shared by every caller of the region.
    fn next_timestamp(&self) -> u64;

    async fn get(&self, key: &CacheKey) -> Result<Option<Entry<V>>>;

    async fn put(&self, key: CacheKey, entry: Entry<V>) -> Result<()>;

    /// Returns true if something was removed.
    async fn remove(&self, key: &CacheKey) -> Result<bool>;

    /// Clears the region. Returns the number of entries dropped.
    async fn remove_all(&self) -> Result<usize>;

    /// Atomically reads, decides and writes one key.
    async fn compute(&self, key: &CacheKey, processor: EntryProcessor<V>) -> Result<Outcome<V>>;

    /// Drops expired soft locks and values. Returns the number removed.
    async fn cleanup_expired(&self) -> Result<usize>;

    async fn stats(&self) -> CacheStats;
}

// == In-Memory Store ==
/// Region store kept in process memory.
///
/// Bounded by `max_entries`; past the bound the least recently used entry
/// that is not a live soft lock is evicted.
#[derive(Debug)]
pub struct InMemoryRegionCache<V> {
    name: String,
    inner: RwLock<Inner<V>>,
    clock: Arc<dyn Clock>,
    max_entries: usize,
    time_to_live_ms: Option<u64>,
}

#[derive(Debug)]
struct Inner<V> {
    entries: HashMap<CacheKey, Entry<V>>,
    lru: LruTracker,
    stats: CacheStats,
}

impl<V> InMemoryRegionCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a store on the system clock.
    ///
    /// # Arguments
    /// * `name` - Region name
    /// * `max_entries` - Entry budget
    /// * `time_to_live_ms` - Value lifetime; `None` or 0 disables expiry
    pub fn new(name: impl Into<String>, max_entries: usize, time_to_live_ms: Option<u64>) -> Self {
        Self {
            name: name.into(),
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                lru: LruTracker::new(),
                stats: CacheStats::new(),
            }),
            clock: Arc::new(SystemClock),
            max_entries,
            time_to_live_ms: time_to_live_ms.filter(|ttl| *ttl > 0),
        }
    }

    /// Creates a store sized and timed by a region configuration.
    pub fn from_config(name: impl Into<String>, config: &RegionConfig) -> Self {
        Self::new(name, config.max_entries, config.time_to_live_ms)
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }
}

impl<V> Inner<V> {
    /// Drops the key's value if it outlived the region TTL.
    fn expire_if_stale(&mut self, key: &CacheKey, now: u64, time_to_live_ms: Option<u64>) {
        let stale = matches!(
            self.entries.get(key),
            Some(Entry::Value(value)) if value.is_expired(now, time_to_live_ms)
        );
        if stale {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_expirations(1);
        }
    }

    fn store(
        &mut self,
        key: CacheKey,
        entry: Entry<V>,
        now: u64,
        max_entries: usize,
    ) -> Result<()> {
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= max_entries {
            let entries = &self.entries;
            let evicted = self
                .lru
                .evict_oldest_where(|k| entries.get(k).map_or(true, |e| !e.is_live_lock(now)));

            match evicted {
                Some(evicted_key) => {
                    self.entries.remove(&evicted_key);
                    self.stats.record_eviction();
                    debug!(key = %evicted_key, "evicted least recently used entry");
                }
                None => {
                    return Err(CacheError::CacheFull(format!(
                        "all {} entries hold live soft locks",
                        self.entries.len()
                    )));
                }
            }
        }

        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);
        self.stats.record_put();
        Ok(())
    }

    fn remove(&mut self, key: &CacheKey) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.lru.remove(key);
        removed
    }
}

#[async_trait]
impl<V> RegionCache<V> for InMemoryRegionCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn next_timestamp(&self) -> u64 {
        self.clock.now_ms()
    }

    // == Get ==
    /// Returns the key's entry. Values past their TTL are dropped and read as
    /// absent; soft locks are returned as stored.
    async fn get(&self, key: &CacheKey) -> Result<Option<Entry<V>>> {
        let now = self.next_timestamp();
        let mut inner = self.inner.write().await;
        inner.expire_if_stale(key, now, self.time_to_live_ms);

        let entry = inner.entries.get(key).cloned();
        match &entry {
            Some(Entry::Value(_)) => {
                inner.stats.record_hit();
                inner.lru.touch(key);
            }
            _ => inner.stats.record_miss(),
        }
        Ok(entry)
    }

    async fn put(&self, key: CacheKey, entry: Entry<V>) -> Result<()> {
        let now = self.next_timestamp();
        let mut inner = self.inner.write().await;
        inner.store(key, entry, now, self.max_entries)
    }

    async fn remove(&self, key: &CacheKey) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let removed = inner.remove(key);
        if removed {
            inner.stats.record_removal();
        }
        Ok(removed)
    }

    async fn remove_all(&self) -> Result<usize> {
        let mut inner = self.inner.write().await;
        let count = inner.entries.len();
        inner.entries.clear();
        inner.lru.clear();
        inner.stats.removals += count as u64;
        Ok(count)
    }

    // == Compute ==
    async fn compute(&self, key: &CacheKey, processor: EntryProcessor<V>) -> Result<Outcome<V>> {
        let now = self.next_timestamp();
        let mut inner = self.inner.write().await;
        inner.expire_if_stale(key, now, self.time_to_live_ms);

        match processor(inner.entries.get(key)) {
            Mutation::Keep => Ok(Outcome {
                applied: Applied::Unchanged,
                entry: inner.entries.get(key).cloned(),
            }),
            Mutation::Set(entry) => {
                inner.store(key.clone(), entry.clone(), now, self.max_entries)?;
                Ok(Outcome {
                    applied: Applied::Stored,
                    entry: Some(entry),
                })
            }
            Mutation::Remove => {
                if inner.remove(key) {
                    inner.stats.record_removal();
                }
                Ok(Outcome {
                    applied: Applied::Removed,
                    entry: None,
                })
            }
        }
    }

    // == Cleanup Expired ==
    async fn cleanup_expired(&self) -> Result<usize> {
        let now = self.next_timestamp();
        let mut inner = self.inner.write().await;

        let expired_keys: Vec<CacheKey> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, self.time_to_live_ms))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            inner.remove(key);
        }

        let count = expired_keys.len();
        inner.stats.record_expirations(count);
        Ok(count)
    }

    // == Stats ==
    async fn stats(&self) -> CacheStats {
        let now = self.next_timestamp();
        let inner = self.inner.read().await;
        let mut stats = inner.stats.clone();
        stats.total_entries = inner.entries.len();
        stats.locked_entries = inner
            .entries
            .values()
            .filter(|entry| entry.is_live_lock(now))
            .count();
        stats
    }
}
