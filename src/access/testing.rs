//! Shared fixtures for access strategy tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::{
    CacheKey, CacheStats, Entry, EntryProcessor, InMemoryRegionCache, ManualClock, Outcome,
    RegionCache,
};
use crate::config::RegionConfig;
use crate::error::{CacheError, Result};

/// In-memory region on a clock stopped at 0.
pub fn manual_region(
    config: &RegionConfig,
) -> (Arc<ManualClock>, Arc<InMemoryRegionCache<String>>) {
    let clock = Arc::new(ManualClock::new(0));
    let cache = InMemoryRegionCache::from_config("test-region", config).with_clock(clock.clone());
    (clock, Arc::new(cache))
}

/// Store whose every call fails, as if the network were down.
#[derive(Debug, Default)]
pub struct FailingRegionCache;

fn unreachable_store() -> CacheError {
    CacheError::Store("connection refused".to_string())
}

#[async_trait]
impl<V> RegionCache<V> for FailingRegionCache
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        "failing"
    }

    fn next_timestamp(&self) -> u64 {
        0
    }

    async fn get(&self, _key: &CacheKey) -> Result<Option<Entry<V>>> {
        Err(unreachable_store())
    }

    async fn put(&self, _key: CacheKey, _entry: Entry<V>) -> Result<()> {
        Err(unreachable_store())
    }

    async fn remove(&self, _key: &CacheKey) -> Result<bool> {
        Err(unreachable_store())
    }

    async fn remove_all(&self) -> Result<usize> {
        Err(unreachable_store())
    }

    async fn compute(&self, _key: &CacheKey, _processor: EntryProcessor<V>) -> Result<Outcome<V>> {
        Err(unreachable_store())
    }

    async fn cleanup_expired(&self) -> Result<usize> {
        Err(unreachable_store())
    }

    async fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}
