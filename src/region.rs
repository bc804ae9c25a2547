//! Region Module
//!
//! A named keyspace: one backing store plus the settings its access
//! strategies run with.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::access::{AccessStrategy, AccessType};
use crate::cache::{InMemoryRegionCache, RegionCache};
use crate::config::RegionConfig;
use crate::error::Result;

// == Region ==
#[derive(Debug)]
pub struct Region<C, V> {
    cache: Arc<C>,
    config: RegionConfig,
    _value: PhantomData<fn() -> V>,
}

impl<C, V> Region<C, V>
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

    pub fn name(&self) -> &str {
        self.cache.name()
    }

    pub fn config(&self) -> &RegionConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    /// Builds an access strategy sharing this region's store.
    ///
    /// Strategies built from the same region see each other's soft locks.
    pub fn build_access_strategy(&self, access_type: AccessType) -> Result<AccessStrategy<C, V>> {
        AccessStrategy::build(self.cache.clone(), self.config.clone(), access_type)
    }

    /// Parses `access_type` (e.g. `"read-write"`) and builds the strategy.
    pub fn build_access_strategy_named(&self, access_type: &str) -> Result<AccessStrategy<C, V>> {
        self.build_access_strategy(access_type.parse()?)
    }
}

impl<V> Region<InMemoryRegionCache<V>, V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Region backed by an in-process store on the system clock.
    pub fn in_memory(name: impl Into<String>, config: RegionConfig) -> Self {
        let cache = InMemoryRegionCache::from_config(name, &config);
        Self::new(Arc::new(cache), config)
    }
}
