//! Read-Write Strategy
//!
//! Strict strategy built on soft locks. A writer locks the key before
//! touching the authoritative source; from then on reads miss and loads are
//! dropped until every holder has released the lock. The new value is
//! cached only by the last holder, and only if its transaction committed.
//!
//! Per key:
//!
//! ```text
//! UNLOCKED --lock--> LOCKED(1) --lock--> LOCKED(n+1)
//! LOCKED(n>1) --after_update / unlock--> LOCKED(n-1)
//! LOCKED(1)   --after_update(committed)--> value cached
//! LOCKED(1)   --unlock / rollback-------> absent
//! LOCKED(*)   --window closes-----------> absent
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use crate::access::{AccessDelegate, Release, SoftLock};
use crate::cache::{Applied, CacheKey, CachedValue, Entry, Mutation, RegionCache};
use crate::config::RegionConfig;
use crate::error::Result;

// == Read-Write Delegate ==
#[derive(Debug)]
pub struct ReadWriteDelegate<C, V> {
    base: AccessDelegate<C, V>,
}

impl<C, V> ReadWriteDelegate<C, V>
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

    /// Misses whenever a soft lock holds the key.
    pub async fn get(&self, key: &CacheKey, tx_timestamp: u64) -> Option<V> {
        self.base.get(key, tx_timestamp).await
    }

    /// Dropped entirely while a live soft lock holds the key.
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

    // == Lock ==
    /// Creates the key's soft lock, or joins the live one.
    ///
    /// Joining adds a holder, keeps the lock id and pushes the window out to
    /// `now + lock_timeout_ms`. An expired lock is replaced by a new one, as
    /// is any cached value. The create-or-join step runs inside the store's
    /// atomic `compute`.
    ///
    /// If the store fails, the key is removed instead so that no stale value
    /// survives the write, and no token is returned.
    pub async fn lock(&self, key: &CacheKey, version: Option<u64>) -> Result<Option<SoftLock>> {
        let now = self.base.next_timestamp();
        let timeout_ms = self.base.config().lock_timeout_ms;

        let processor = Box::new(move |current: Option<&Entry<V>>| match current {
            Some(Entry::Lock(lock)) if lock.is_live(now) => {
                Mutation::Set(Entry::Lock(lock.extend(version, now, timeout_ms)))
            }
            _ => Mutation::Set(Entry::Lock(SoftLock::acquire(version, now, timeout_ms))),
        });

        match self.base.cache().compute(key, processor).await {
            Ok(outcome) => {
                let lock = outcome.lock().cloned();
                if let Some(lock) = &lock {
                    debug!(
                        region = %self.base.region_name(),
                        key = %key,
                        lock_id = %lock.lock_id,
                        holders = lock.holders,
                        unlock_timestamp = lock.unlock_timestamp,
                        "soft lock held"
                    );
                }
                Ok(lock)
            }
            Err(err) => {
                warn!(
                    region = %self.base.region_name(),
                    key = %key,
                    error = %err,
                    "lock failed, invalidating key"
                );
                self.invalidate_unfenced(key).await?;
                Ok(None)
            }
        }
    }

    // == Update ==
    /// Checks that a live soft lock holds `key` and that `new_version` may be
    /// written under it. Writes nothing; the value is cached by `after_update`.
    pub async fn update(
        &self,
        key: &CacheKey,
        new_version: Option<u64>,
        previous_version: Option<u64>,
    ) -> Result<bool> {
        if let (Some(new), Some(previous)) = (new_version, previous_version) {
            if new < previous {
                debug!(
                    region = %self.base.region_name(),
                    key = %key,
                    new,
                    previous,
                    "update goes backwards"
                );
                return Ok(false);
            }
        }
        Ok(self.check_lock(key, new_version).await)
    }

    // == Insert ==
    /// Same check as `update` for a first-time write. The value is cached by
    /// `after_insert`.
    pub async fn insert(&self, key: &CacheKey, version: Option<u64>) -> Result<bool> {
        Ok(self.check_lock(key, version).await)
    }

    // == After Update ==
    /// Releases this transaction's hold on the key's soft lock.
    ///
    /// Caches `value` only when this was the last holder, the transaction
    /// committed, and the lock is still the one `lock` returned and still
    /// live. Otherwise the key is left empty so the next reader reloads.
    /// Returns true if the value was cached.
    pub async fn after_update(
        &self,
        key: &CacheKey,
        value: V,
        new_version: Option<u64>,
        lock: Option<&SoftLock>,
        committed: bool,
    ) -> Result<bool> {
        match lock {
            Some(lock) => Ok(self.release(key, Some(value), new_version, lock, committed).await),
            None => {
                // Locking failed earlier; drop whatever may now be stale
                if committed {
                    self.invalidate_unfenced(key).await?;
                }
                Ok(false)
            }
        }
    }

    // == After Insert ==
    /// Same release rule as `after_update` for a locked insert.
    ///
    /// An insert that never locked caches its value only if the key is still
    /// empty: nothing else can have seen a row that did not exist yet.
    pub async fn after_insert(
        &self,
        key: &CacheKey,
        value: V,
        version: Option<u64>,
        lock: Option<&SoftLock>,
        committed: bool,
    ) -> Result<bool> {
        if let Some(lock) = lock {
            return Ok(self.release(key, Some(value), version, lock, committed).await);
        }
        if !committed {
            return Ok(false);
        }

        let now = self.base.next_timestamp();
        let processor = Box::new(move |current: Option<&Entry<V>>| match current {
            None => Mutation::Set(Entry::Value(CachedValue::new(value, version, now))),
            Some(Entry::Lock(lock)) if !lock.is_live(now) => {
                Mutation::Set(Entry::Value(CachedValue::new(value, version, now)))
            }
            Some(_) => Mutation::Keep,
        });

        match self.base.cache().compute(key, processor).await {
            Ok(outcome) => Ok(outcome.wrote_value()),
            Err(err) => {
                warn!(
                    region = %self.base.region_name(),
                    key = %key,
                    error = %err,
                    "after insert failed"
                );
                Ok(false)
            }
        }
    }

    // == Unlock ==
    /// Releases without writing, for a transaction that gives up before
    /// `after_update`. The last holder leaves the key empty.
    pub async fn unlock(&self, key: &CacheKey, lock: Option<&SoftLock>) -> Result<()> {
        if let Some(lock) = lock {
            self.release(key, None, None, lock, false).await;
        }
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

    /// True while a live soft lock holds `key` and accepts `version`.
    async fn check_lock(&self, key: &CacheKey, version: Option<u64>) -> bool {
        let now = self.base.next_timestamp();
        match self.base.cache().get(key).await {
            Ok(Some(Entry::Lock(lock))) if lock.is_live(now) => lock.accepts_version(version),
            Ok(_) => {
                debug!(
                    region = %self.base.region_name(),
                    key = %key,
                    "write without a live soft lock"
                );
                false
            }
            Err(err) => {
                warn!(
                    region = %self.base.region_name(),
                    key = %key,
                    error = %err,
                    "soft lock check failed"
                );
                false
            }
        }
    }

    /// Removes a cached value or an expired lock. A live lock belongs to a
    /// writer still in flight and is left fencing the key.
    async fn invalidate_unfenced(&self, key: &CacheKey) -> Result<bool> {
        let now = self.base.next_timestamp();
        let processor = Box::new(move |current: Option<&Entry<V>>| match current {
            Some(Entry::Lock(lock)) if lock.is_live(now) => Mutation::Keep,
            Some(_) => Mutation::Remove,
            None => Mutation::Keep,
        });

        let outcome = self.base.cache().compute(key, processor).await.map_err(|err| {
            warn!(
                region = %self.base.region_name(),
                key = %key,
                error = %err,
                "invalidation failed"
            );
            err
        })?;
        Ok(matches!(outcome.applied, Applied::Removed))
    }

    // == Release ==
    /// Drops one holder of `token` inside the store's atomic `compute`.
    ///
    /// A different caller's lock is never touched. If a value sits where this
    /// caller's lock used to be (the lock expired and a load got in), a
    /// committed release removes it, since that load may predate the commit.
    ///
    /// A store failure leaves the lock in place; its window closes on its own.
    async fn release(
        &self,
        key: &CacheKey,
        value: Option<V>,
        version: Option<u64>,
        token: &SoftLock,
        committed: bool,
    ) -> bool {
        let now = self.base.next_timestamp();
        let token = token.clone();
        let lock_id = token.lock_id;

        let processor = Box::new(move |current: Option<&Entry<V>>| match current {
            Some(Entry::Lock(held)) if held.is_same(&token) => match held.release(now, committed) {
                Release::Held(next) => Mutation::Set(Entry::Lock(next)),
                Release::Write if held.accepts_version(version) => match value {
                    Some(value) => {
                        Mutation::Set(Entry::Value(CachedValue::new(value, version, now)))
                    }
                    None => Mutation::Remove,
                },
                Release::Write | Release::Clear => Mutation::Remove,
            },
            Some(Entry::Lock(_)) => Mutation::Keep,
            Some(Entry::Value(_)) if committed => Mutation::Remove,
            _ => Mutation::Keep,
        });

        match self.base.cache().compute(key, processor).await {
            Ok(outcome) => {
                let written = outcome.wrote_value();
                debug!(
                    region = %self.base.region_name(),
                    key = %key,
                    lock_id = %lock_id,
                    committed,
                    written,
                    holders = outcome.lock().map(|l| l.holders).unwrap_or(0),
                    "soft lock released"
                );
                written
            }
            Err(err) => {
                warn!(
                    region = %self.base.region_name(),
                    key = %key,
                    error = %err,
                    "soft lock release failed"
                );
                false
            }
        }
    }
}
