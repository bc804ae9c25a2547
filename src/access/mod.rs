//! Access Module
//!
//! Concurrency policies a transactional caller drives a region through.
//!
//! # Strategies
//! - `read-only`: first write wins, updates are refused
//! - `nonstrict-read-write`: writes invalidate the key, nothing is fenced
//! - `read-write`: writes are fenced by soft locks
//!
//! All three funnel reads and loads through [`AccessDelegate`].

mod delegate;
mod nonstrict;
mod read_only;
mod read_write;
mod soft_lock;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{CacheKey, RegionCache};
use crate::config::RegionConfig;
use crate::error::{CacheError, Result};

pub use delegate::AccessDelegate;
pub use nonstrict::NonStrictReadWriteDelegate;
pub use read_only::ReadOnlyDelegate;
pub use read_write::ReadWriteDelegate;
pub use soft_lock::{Release, SoftLock};

// == Access Type ==
/// Access policy requested for a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessType {
    ReadOnly,
    NonstrictReadWrite,
    ReadWrite,
    /// Recognised so it can be refused with a clear message.
    Transactional,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::ReadOnly => "read-only",
            AccessType::NonstrictReadWrite => "nonstrict-read-write",
            AccessType::ReadWrite => "read-write",
            AccessType::Transactional => "transactional",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessType {
    type Err = CacheError;

    /// Accepts kebab-case or snake_case names, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "read-only" => Ok(AccessType::ReadOnly),
            "nonstrict-read-write" => Ok(AccessType::NonstrictReadWrite),
            "read-write" => Ok(AccessType::ReadWrite),
            "transactional" => Ok(AccessType::Transactional),
            other => Err(CacheError::Configuration(format!(
                "unknown access type \"{}\"",
                other
            ))),
        }
    }
}

// == Access Strategy ==
/// A region's access policy, one variant per supported [`AccessType`].
#[derive(Debug)]
pub enum AccessStrategy<C, V> {
    ReadOnly(ReadOnlyDelegate<C, V>),
    NonStrictReadWrite(NonStrictReadWriteDelegate<C, V>),
    ReadWrite(ReadWriteDelegate<C, V>),
}

impl<C, V> AccessStrategy<C, V>
where
    C: RegionCache<V>,
    V: Clone + Send + Sync + 'static,
{
    // == Build ==
    /// Builds the strategy for `access_type` over a region store.
    ///
    /// Unsupported access types fail here, never per operation.
    pub fn build(cache: Arc<C>, config: RegionConfig, access_type: AccessType) -> Result<Self> {
        let strategy = match access_type {
            AccessType::ReadOnly => AccessStrategy::ReadOnly(ReadOnlyDelegate::new(cache, config)),
            AccessType::NonstrictReadWrite => {
                AccessStrategy::NonStrictReadWrite(NonStrictReadWriteDelegate::new(cache, config))
            }
            AccessType::ReadWrite => {
                AccessStrategy::ReadWrite(ReadWriteDelegate::new(cache, config))
            }
            AccessType::Transactional => {
                return Err(CacheError::Configuration(format!(
                    "access type \"{}\" is not supported by region '{}'",
                    access_type,
                    cache.name()
                )));
            }
        };

        info!(
            region = %strategy.region_name(),
            access_type = %access_type,
            "access strategy built"
        );
        Ok(strategy)
    }

    pub fn access_type(&self) -> AccessType {
        match self {
            AccessStrategy::ReadOnly(_) => AccessType::ReadOnly,
            AccessStrategy::NonStrictReadWrite(_) => AccessType::NonstrictReadWrite,
            AccessStrategy::ReadWrite(_) => AccessType::ReadWrite,
        }
    }

    fn base(&self) -> &AccessDelegate<C, V> {
        match self {
            AccessStrategy::ReadOnly(d) => d.base(),
            AccessStrategy::NonStrictReadWrite(d) => d.base(),
            AccessStrategy::ReadWrite(d) => d.base(),
        }
    }

    pub fn region_name(&self) -> &str {
        self.base().region_name()
    }

    pub fn config(&self) -> &RegionConfig {
        self.base().config()
    }

    pub fn cache(&self) -> &Arc<C> {
        self.base().cache()
    }

    pub fn next_timestamp(&self) -> u64 {
        self.base().next_timestamp()
    }

    // == Caller-Facing Operations ==

    pub async fn get(&self, key: &CacheKey, tx_timestamp: u64) -> Option<V> {
        match self {
            AccessStrategy::ReadOnly(d) => d.get(key, tx_timestamp).await,
            AccessStrategy::NonStrictReadWrite(d) => d.get(key, tx_timestamp).await,
            AccessStrategy::ReadWrite(d) => d.get(key, tx_timestamp).await,
        }
    }

    pub async fn put_from_load(
        &self,
        key: &CacheKey,
        value: V,
        tx_timestamp: u64,
        version: Option<u64>,
        minimal_put_override: bool,
    ) -> bool {
        match self {
            AccessStrategy::ReadOnly(d) => {
                d.put_from_load(key, value, tx_timestamp, version, minimal_put_override)
                    .await
            }
            AccessStrategy::NonStrictReadWrite(d) => {
                d.put_from_load(key, value, tx_timestamp, version, minimal_put_override)
                    .await
            }
            AccessStrategy::ReadWrite(d) => {
                d.put_from_load(key, value, tx_timestamp, version, minimal_put_override)
                    .await
            }
        }
    }

    pub async fn insert(&self, key: &CacheKey, value: V, version: Option<u64>) -> Result<bool> {
        match self {
            AccessStrategy::ReadOnly(d) => d.insert(key, value, version).await,
            AccessStrategy::NonStrictReadWrite(d) => d.insert(key).await,
            AccessStrategy::ReadWrite(d) => d.insert(key, version).await,
        }
    }

    /// `value` is only cached by `after_update` under read-write access.
    pub async fn update(
        &self,
        key: &CacheKey,
        _value: V,
        new_version: Option<u64>,
        previous_version: Option<u64>,
    ) -> Result<bool> {
        match self {
            AccessStrategy::ReadOnly(d) => d.update(key).await,
            AccessStrategy::NonStrictReadWrite(d) => d.update(key).await,
            AccessStrategy::ReadWrite(d) => d.update(key, new_version, previous_version).await,
        }
    }

    pub async fn lock(&self, key: &CacheKey, version: Option<u64>) -> Result<Option<SoftLock>> {
        match self {
            AccessStrategy::ReadOnly(d) => d.lock(key).await,
            AccessStrategy::NonStrictReadWrite(d) => d.lock(key).await,
            AccessStrategy::ReadWrite(d) => d.lock(key, version).await,
        }
    }

    pub async fn unlock(&self, key: &CacheKey, lock: Option<&SoftLock>) -> Result<()> {
        match self {
            AccessStrategy::ReadOnly(d) => d.unlock(key).await,
            AccessStrategy::NonStrictReadWrite(d) => d.unlock(key).await,
            AccessStrategy::ReadWrite(d) => d.unlock(key, lock).await,
        }
    }

    pub async fn after_insert(
        &self,
        key: &CacheKey,
        value: V,
        version: Option<u64>,
        lock: Option<&SoftLock>,
        committed: bool,
    ) -> Result<bool> {
        match self {
            AccessStrategy::ReadOnly(d) => d.after_insert(key, value, version, committed).await,
            AccessStrategy::NonStrictReadWrite(d) => d.after_insert(key).await,
            AccessStrategy::ReadWrite(d) => {
                d.after_insert(key, value, version, lock, committed).await
            }
        }
    }

    pub async fn after_update(
        &self,
        key: &CacheKey,
        value: V,
        new_version: Option<u64>,
        lock: Option<&SoftLock>,
        committed: bool,
    ) -> Result<bool> {
        match self {
            AccessStrategy::ReadOnly(d) => d.after_update(key).await,
            AccessStrategy::NonStrictReadWrite(d) => d.after_update(key).await,
            AccessStrategy::ReadWrite(d) => {
                d.after_update(key, value, new_version, lock, committed).await
            }
        }
    }

    pub async fn remove(&self, key: &CacheKey) -> Result<bool> {
        match self {
            AccessStrategy::ReadOnly(d) => d.remove(key).await,
            AccessStrategy::NonStrictReadWrite(d) => d.remove(key).await,
            AccessStrategy::ReadWrite(d) => d.remove(key).await,
        }
    }

    pub async fn remove_all(&self) -> Result<usize> {
        match self {
            AccessStrategy::ReadOnly(d) => d.remove_all().await,
            AccessStrategy::NonStrictReadWrite(d) => d.remove_all().await,
            AccessStrategy::ReadWrite(d) => d.remove_all().await,
        }
    }

    pub async fn evict(&self, key: &CacheKey) -> Result<bool> {
        match self {
            AccessStrategy::ReadOnly(d) => d.evict(key).await,
            AccessStrategy::NonStrictReadWrite(d) => d.evict(key).await,
            AccessStrategy::ReadWrite(d) => d.evict(key).await,
        }
    }

    pub async fn evict_all(&self) -> Result<usize> {
        match self {
            AccessStrategy::ReadOnly(d) => d.evict_all().await,
            AccessStrategy::NonStrictReadWrite(d) => d.evict_all().await,
            AccessStrategy::ReadWrite(d) => d.evict_all().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::testing::manual_region;

    #[test]
    fn test_access_type_parse() {
        assert_eq!("read-only".parse::<AccessType>().unwrap(), AccessType::ReadOnly);
        assert_eq!("READ_WRITE".parse::<AccessType>().unwrap(), AccessType::ReadWrite);
        assert_eq!(
            " nonstrict-read-write ".parse::<AccessType>().unwrap(),
            AccessType::NonstrictReadWrite
        );
        assert!(matches!(
            "write-behind".parse::<AccessType>(),
            Err(CacheError::Configuration(_))
        ));
        assert!(matches!("".parse::<AccessType>(), Err(CacheError::Configuration(_))));
    }

    #[test]
    fn test_access_type_display_roundtrips() {
        for access in [
            AccessType::ReadOnly,
            AccessType::NonstrictReadWrite,
            AccessType::ReadWrite,
            AccessType::Transactional,
        ] {
            assert_eq!(access.to_string().parse::<AccessType>().unwrap(), access);
        }
    }

    #[test]
    fn test_transactional_rejected_at_build() {
        let config = RegionConfig::default();
        let (_, cache) = manual_region(&config);

        let result = AccessStrategy::build(cache, config, AccessType::Transactional);
        assert!(matches!(result, Err(CacheError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_dispatch_by_access_type() {
        let config = RegionConfig::default();
        let key = CacheKey::new("k");

        for access in [
            AccessType::ReadOnly,
            AccessType::NonstrictReadWrite,
            AccessType::ReadWrite,
        ] {
            let (_, cache) = manual_region(&config);
            let strategy = AccessStrategy::build(cache, config.clone(), access).unwrap();
            assert_eq!(strategy.access_type(), access);
            assert_eq!(strategy.region_name(), "test-region");

            assert!(strategy.put_from_load(&key, "v1".to_string(), 0, Some(1), false).await);
            let lock = strategy.lock(&key, Some(1)).await.unwrap();
            assert_eq!(lock.is_some(), access == AccessType::ReadWrite);

            let updated = strategy.update(&key, "v2".to_string(), Some(2), Some(1)).await;
            match access {
                AccessType::ReadOnly => {
                    assert!(matches!(updated, Err(CacheError::UnsupportedOperation(_))))
                }
                AccessType::NonstrictReadWrite => assert!(!updated.unwrap()),
                _ => assert!(updated.unwrap()),
            }

            let after = strategy
                .after_update(&key, "v2".to_string(), Some(2), lock.as_ref(), true)
                .await;
            match access {
                AccessType::ReadOnly => {
                    assert!(after.is_err());
                    assert_eq!(strategy.get(&key, 0).await, Some("v1".to_string()));
                }
                AccessType::NonstrictReadWrite => {
                    assert!(!after.unwrap());
                    assert_eq!(strategy.get(&key, 0).await, None);
                }
                _ => {
                    assert!(after.unwrap());
                    assert_eq!(strategy.get(&key, 0).await, Some("v2".to_string()));
                }
            }

            let cached = if access == AccessType::NonstrictReadWrite { 0 } else { 1 };
            assert_eq!(strategy.evict_all().await.unwrap(), cached);
        }
    }
}
