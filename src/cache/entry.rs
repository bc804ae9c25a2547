//! Cache Entry Module
//!
//! Defines what a region stores per key: either a committed value or a
//! soft lock standing in for it while a write is in flight.

use serde::{Deserialize, Serialize};

use crate::access::SoftLock;

// == Cached Value ==
/// A committed payload with its caller version and store write time.
///
/// Never mutated in place; a newer write replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedValue<V> {
    /// The stored payload
    pub value: V,
    /// Caller-supplied version (e.g. optimistic-lock version)
    pub version: Option<u64>,
    /// Write time assigned by the store (Unix milliseconds)
    pub timestamp: u64,
}

impl<V> CachedValue<V> {
    // == Constructor ==
    pub fn new(value: V, version: Option<u64>, timestamp: u64) -> Self {
        Self {
            value,
            version,
            timestamp,
        }
    }

    // == Is Expired ==
    /// Checks the value against a region time-to-live.
    ///
    /// Expired once `now >= timestamp + ttl`. A missing or zero TTL never expires.
    pub fn is_expired(&self, now: u64, time_to_live_ms: Option<u64>) -> bool {
        match time_to_live_ms {
            Some(ttl) if ttl > 0 => now >= self.timestamp.saturating_add(ttl),
            _ => false,
        }
    }

    // == Staleness Comparison ==
    /// True if this value is strictly newer than a load that read `version`
    /// in a transaction started at `tx_timestamp`.
    ///
    /// Versions decide when both sides carry one, write time otherwise.
    pub fn is_newer_than(&self, tx_timestamp: u64, version: Option<u64>) -> bool {
        match (self.version, version) {
            (Some(current), Some(incoming)) => current > incoming,
            _ => self.timestamp > tx_timestamp,
        }
    }

    /// True if this value is at least as new as the incoming load.
    pub fn is_at_least(&self, tx_timestamp: u64, version: Option<u64>) -> bool {
        match (self.version, version) {
            (Some(current), Some(incoming)) => current >= incoming,
            _ => self.timestamp >= tx_timestamp,
        }
    }
}

// == Entry ==
/// Stored state of one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry<V> {
    Value(CachedValue<V>),
    Lock(SoftLock),
}

impl<V> Entry<V> {
    pub fn as_lock(&self) -> Option<&SoftLock> {
        match self {
            Entry::Lock(lock) => Some(lock),
            Entry::Value(_) => None,
        }
    }

    /// True for a lock whose window is still open at `now`.
    pub fn is_live_lock(&self, now: u64) -> bool {
        self.as_lock().is_some_and(|lock| lock.is_live(now))
    }

    /// True if the store may drop this entry at `now`: an expired lock or a
    /// value past its time-to-live.
    pub fn is_expired(&self, now: u64, time_to_live_ms: Option<u64>) -> bool {
        match self {
            Entry::Value(value) => value.is_expired(now, time_to_live_ms),
            Entry::Lock(lock) => !lock.is_live(now),
        }
    }
}

// == Mutation ==
/// Decision returned by an entry processor.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<V> {
    /// Leave the slot as it is
    Keep,
    /// Store a new entry
    Set(Entry<V>),
    /// Clear the slot
    Remove,
}

/// What `compute` ended up doing to the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Unchanged,
    Stored,
    Removed,
}

// == Outcome ==
/// Result of an atomic per-key update.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<V> {
    pub applied: Applied,
    /// Slot contents after the update
    pub entry: Option<Entry<V>>,
}

impl<V> Outcome<V> {
    /// True if the update stored a committed value.
    pub fn wrote_value(&self) -> bool {
        self.applied == Applied::Stored && matches!(self.entry, Some(Entry::Value(_)))
    }

    /// The lock now held in the slot, if any.
    pub fn lock(&self) -> Option<&SoftLock> {
        self.entry.as_ref().and_then(Entry::as_lock)
    }
}

/// Atomic per-key update run by the store while it holds the slot.
pub type EntryProcessor<V> = Box<dyn FnOnce(Option<&Entry<V>>) -> Mutation<V> + Send>;
