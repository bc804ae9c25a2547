//! Non-Strict Read-Write Strategy
//!
//! Writes invalidate instead of replacing. Without a fence there is no way
//! to tell whether a concurrent load will land after the write commits, so
//! the key is emptied and the next reader reloads it.
//!
//! Never blocks and never fails on contention; the cost is a short window
//! in which a racing load can re-cache the old row.

use std::sync::Arc;

use tracing::debug;

use crate::access::{AccessDelegate, SoftLock};
use crate::cache::{CacheKey, RegionCache};
use crate::config::RegionConfig;
use crate::error::Result;

// == Non-Strict Read-Write Delegate ==
#[derive(Debug)]
pub struct NonStrictReadWriteDelegate<C, V> {
    base: AccessDelegate<C, V>,
}

impl<C, V> NonStrictReadWriteDelegate<C, V>
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

    pub async fn put_from_load(
        &self,
        key: &CacheKey,
        value: V,
        tx_timestamp: u64,
        version: Option<u64>,
        minimal_put_override: bool,
    ) -> bool {
        self.base
            .put_from_load(key, value, tx_timestamp, version, minimal_put_override)
            .await
    }

    /// Empties the key. The new value is never cached here.
    pub async fn insert(&self, key: &CacheKey) -> Result<bool> {
        self.invalidate(key).await
    }

    /// Empties the key. The new value is never cached here.
    pub async fn update(&self, key: &CacheKey) -> Result<bool> {
        self.invalidate(key).await
    }

    // Removal already happened eagerly.
    pub async fn after_insert(&self, _key: &CacheKey) -> Result<bool> {
        Ok(false)
    }

    pub async fn after_update(&self, _key: &CacheKey) -> Result<bool> {
        Ok(false)
    }

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

    async fn invalidate(&self, key: &CacheKey) -> Result<bool> {
        let removed = self.base.remove(key).await?;
        debug!(region = %self.base.region_name(), key = %key, removed, "write invalidated key");
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::testing::{manual_region, FailingRegionCache};
    use crate::cache::InMemoryRegionCache;

    fn nonstrict() -> NonStrictReadWriteDelegate<InMemoryRegionCache<String>, String> {
        let config = RegionConfig::default();
        let (_, cache) = manual_region(&config);
        NonStrictReadWriteDelegate::new(cache, config)
    }

    #[tokio::test]
    async fn test_update_removes_cached_value() {
        let delegate = nonstrict();
        let key = CacheKey::new("user#1");

        assert!(delegate.put_from_load(&key, "alice".into(), 0, Some(1), false).await);
        assert!(!delegate.update(&key).await.unwrap());
        assert_eq!(delegate.get(&key, 0).await, None);

        assert!(!delegate.after_update(&key).await.unwrap());
        assert_eq!(delegate.get(&key, 0).await, None);
    }

    #[tokio::test]
    async fn test_insert_removes_cached_value() {
        let delegate = nonstrict();
        let key = CacheKey::new("user#2");

        delegate.put_from_load(&key, "racing load".into(), 0, None, false).await;
        assert!(!delegate.insert(&key).await.unwrap());
        assert!(!delegate.after_insert(&key).await.unwrap());
        assert_eq!(delegate.get(&key, 0).await, None);
    }

    #[tokio::test]
    async fn test_reload_after_invalidation() {
        let delegate = nonstrict();
        let key = CacheKey::new("user#1");

        delegate.put_from_load(&key, "v1".into(), 0, Some(1), false).await;
        delegate.update(&key).await.unwrap();
        assert!(delegate.put_from_load(&key, "v2".into(), 0, Some(2), false).await);
        assert_eq!(delegate.get(&key, 0).await, Some("v2".to_string()));
    }

    #[tokio::test]
    async fn test_never_fences() {
        let delegate = nonstrict();
        let key = CacheKey::new("user#1");

        assert_eq!(delegate.lock(&key).await.unwrap(), None);
        assert!(delegate.put_from_load(&key, "v".into(), 0, None, false).await);
        delegate.unlock(&key).await.unwrap();
        assert_eq!(delegate.get(&key, 0).await, Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_failed_invalidation_is_reported() {
        let delegate: NonStrictReadWriteDelegate<FailingRegionCache, String> =
            NonStrictReadWriteDelegate::new(Arc::new(FailingRegionCache), RegionConfig::default());

        assert!(delegate.update(&CacheKey::new("k")).await.is_err());
    }
}
