//! Access Delegate Module
//!
//! Behaviour shared by every access strategy: fenced reads, guarded loads
//! and unconditional removal.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{CacheKey, CachedValue, Entry, Mutation, RegionCache};
use crate::config::RegionConfig;
use crate::error::Result;

// == Access Delegate ==
/// Wraps a region store and applies the read and load rules common to all
/// strategies.
///
/// Holds no per-key state of its own; everything lives in the store.
#[derive(Debug)]
pub struct AccessDelegate<C, V> {
    cache: Arc<C>,
    config: RegionConfig,
    _value: PhantomData<fn() -> V>,
}

impl<C, V> AccessDelegate<C, V>
where
    C: RegionCache<V>,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(cache: Arc<C>, config: RegionConfig) -> Self {
        Self {
            cache,
            config,
            _value: PhantomData,
        }
    }

    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    pub fn config(&self) -> &RegionConfig {
        &self.config
    }

    pub fn region_name(&self) -> &str {
        self.cache.name()
    }

    pub fn next_timestamp(&self) -> u64 {
        self.cache.next_timestamp()
    }

    // == Get ==
    /// Returns the cached value for `key`, or `None` when nothing is cached,
    /// a soft lock fences the key, or the store cannot answer.
    pub async fn get(&self, key: &CacheKey, tx_timestamp: u64) -> Option<V> {
        match self.cache.get(key).await {
            Ok(Some(Entry::Value(cached))) => Some(cached.value),
            Ok(Some(Entry::Lock(lock))) => {
                if lock.is_live(self.next_timestamp()) && lock.covers(tx_timestamp) {
                    debug!(region = %self.region_name(), key = %key, "read fenced by soft lock");
                } else {
                    debug!(
                        region = %self.region_name(),
                        key = %key,
                        "expired soft lock read as absent"
                    );
                }
                None
            }
            Ok(None) => None,
            Err(err) => {
                warn!(
                    region = %self.region_name(),
                    key = %key,
                    error = %err,
                    "get failed, treating as miss"
                );
                None
            }
        }
    }

    // == Put From Load ==
    /// Caches a value just read from the authoritative source.
    ///
    /// Dropped without error when a live soft lock holds the key, when the
    /// cached value is newer than the load, or when minimal puts are in effect
    /// and the cached value is at least as new. Returns true if written.
    pub async fn put_from_load(
        &self,
        key: &CacheKey,
        value: V,
        tx_timestamp: u64,
        version: Option<u64>,
        minimal_put_override: bool,
    ) -> bool {
        let now = self.next_timestamp();
        let minimal_put = minimal_put_override || self.config.minimal_puts;

        let processor = Box::new(move |current: Option<&Entry<V>>| match current {
            Some(Entry::Lock(lock)) if lock.is_live(now) => Mutation::Keep,
            Some(Entry::Value(existing))
                if existing.is_newer_than(tx_timestamp, version)
                    || (minimal_put && existing.is_at_least(tx_timestamp, version)) =>
            {
                Mutation::Keep
            }
            _ => Mutation::Set(Entry::Value(CachedValue::new(value, version, now))),
        });

        match self.cache.compute(key, processor).await {
            Ok(outcome) => {
                let written = outcome.wrote_value();
                if !written {
                    debug!(
                        region = %self.region_name(),
                        key = %key,
                        tx_timestamp,
                        "load not cached"
                    );
                }
                written
            }
            Err(err) => {
                warn!(
                    region = %self.region_name(),
                    key = %key,
                    error = %err,
                    "put from load failed"
                );
                false
            }
        }
    }

    // == Remove ==
    /// Deletes the key unconditionally.
    ///
    /// Store failures are returned: a value that could not be removed may be
    /// stale, and there is no answer that would be safe to report instead.
    pub async fn remove(&self, key: &CacheKey) -> Result<bool> {
        self.cache.remove(key).await.map_err(|err| {
            warn!(region = %self.region_name(), key = %key, error = %err, "remove failed");
            err
        })
    }

    pub async fn remove_all(&self) -> Result<usize> {
        self.cache.remove_all().await.map_err(|err| {
            warn!(region = %self.region_name(), error = %err, "remove all failed");
            err
        })
    }

    // == Evict ==
    /// Region-management removal, outside any transaction.
    pub async fn evict(&self, key: &CacheKey) -> Result<bool> {
        self.remove(key).await
    }

    pub async fn evict_all(&self) -> Result<usize> {
        self.remove_all().await
    }
}
