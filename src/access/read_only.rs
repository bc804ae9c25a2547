//! Read-Only Strategy
//!
//! For records that never change once written. The first write of a key
//! wins and every update is refused.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::access::{AccessDelegate, SoftLock};
use crate::cache::{CacheKey, CachedValue, Entry, Mutation, RegionCache};
use crate::config::RegionConfig;
use crate::error::{CacheError, Result};

// == Read-Only Delegate ==
#[derive(Debug)]
pub struct ReadOnlyDelegate<C, V> {
    base: AccessDelegate<C, V>,
}

impl<C, V> ReadOnlyDelegate<C, V>
where
    C: RegionCache<V>,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(cache: Arc<C>, config: RegionConfig) -> Self {
        Self {
            base: AccessDelegate::new(cache, config),
        }
    }

    pub fn base(&self) -> &AccessDelegate<C, V> {
        &self.base
    }

    pub async fn get(&self, key: &CacheKey, tx_timestamp: u64) -> Option<V> {
        self.base.get(key, tx_timestamp).await
    }

    /// Caches a loaded value only if the key holds none yet. A cached value
    /// is never replaced, however new the load.
    pub async fn put_from_load(
        &self,
        key: &CacheKey,
        value: V,
        _tx_timestamp: u64,
        version: Option<u64>,
        _minimal_put_override: bool,
    ) -> bool {
        self.write_once(key, value, version).await
    }

    // == Insert ==
    /// Caches the first value ever written for `key`. Later inserts leave the
    /// cached value alone and return false.
    pub async fn insert(&self, key: &CacheKey, value: V, version: Option<u64>) -> Result<bool> {
        Ok(self.write_once(key, value, version).await)
    }

    /// Same first-write-wins rule, applied once the inserting transaction has
    /// finished. A rolled-back insert writes nothing.
    pub async fn after_insert(
        &self,
        key: &CacheKey,
        value: V,
        version: Option<u64>,
        committed: bool,
    ) -> Result<bool> {
        if !committed {
            return Ok(false);
        }
        Ok(self.write_once(key, value, version).await)
    }

    // == Update ==
    /// Always refused: read-only records never change after their first write.
    pub async fn update(&self, key: &CacheKey) -> Result<bool> {
        Err(self.refuse_update(key))
    }

    pub async fn after_update(&self, key: &CacheKey) -> Result<bool> {
        Err(self.refuse_update(key))
    }

    // Read-only data needs no fencing.
    pub async fn lock(&self, _key: &CacheKey) -> Result<Option<SoftLock>> {
        Ok(None)
    }

    pub async fn unlock(&self, _key: &CacheKey) -> Result<()> {
        Ok(())
    }

    pub async fn remove(&self, key: &CacheKey) -> Result<bool> {
        self.base.remove(key).await
    }

    pub async fn remove_all(&self) -> Result<usize> {
        self.base.remove_all().await
    }

    pub async fn evict(&self, key: &CacheKey) -> Result<bool> {
        self.base.evict(key).await
    }

    pub async fn evict_all(&self) -> Result<usize> {
        self.base.evict_all().await
    }

    async fn write_once(&self, key: &CacheKey, value: V, version: Option<u64>) -> bool {
        let now = self.base.next_timestamp();
        let processor = Box::new(move |current: Option<&Entry<V>>| match current {
            Some(Entry::Value(_)) => Mutation::Keep,
            Some(Entry::Lock(lock)) if lock.is_live(now) => Mutation::Keep,
            _ => Mutation::Set(Entry::Value(CachedValue::new(value, version, now))),
        });

        match self.base.cache().compute(key, processor).await {
            Ok(outcome) => {
                let written = outcome.wrote_value();
                if !written {
                    debug!(
                        region = %self.base.region_name(),
                        key = %key,
                        "read-only key already cached"
                    );
                }
                written
            }
            Err(err) => {
                warn!(
                    region = %self.base.region_name(),
                    key = %key,
                    error = %err,
                    "read-only write failed"
                );
                false
            }
        }
    }

    fn refuse_update(&self, key: &CacheKey) -> CacheError {
        warn!(
            region = %self.base.region_name(),
            key = %key,
            "update attempted on read-only region"
        );
        CacheError::UnsupportedOperation(format!(
            "cannot update '{}' in read-only region '{}'",
            key,
            self.base.region_name()
        ))
    }
}
