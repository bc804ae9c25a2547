//! Soft Lock Module
//!
//! The fencing token a read-write region stores in place of a value while
//! one or more transactions are writing the key.
//!
//! A soft lock is never a blocking lock. It only turns reads and loads of
//! its key into misses until every holder has released it, or until its
//! window closes on its own.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// == Soft Lock ==
/// Per-key write fence shared by every transaction that locked the key
/// while it was live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftLock {
    /// Unique per acquisition; extending a live lock keeps the id
    pub lock_id: Uuid,
    /// Transactions currently referencing this lock
    pub holders: u32,
    /// Highest version passed to `lock` by any holder
    pub version: Option<u64>,
    /// Time the lock was first acquired
    pub created_at: u64,
    /// Time after which the lock is ignored
    pub unlock_timestamp: u64,
    /// Time of the last acquire, extend or release
    pub last_used_timestamp: u64,
    /// Holders that already released after a committed write
    #[serde(default)]
    pub committed_releases: u32,
}

/// What a release leaves behind in the key's slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Release {
    /// Other holders remain; keep this lock
    Held(SoftLock),
    /// Last holder committed; replace the lock with the new value
    Write,
    /// Last holder gone without a trustworthy value; leave the key empty
    Clear,
}

impl SoftLock {
    // == Acquire ==
    /// Creates a fresh lock with a single holder, open until `now + timeout_ms`.
    pub fn acquire(version: Option<u64>, now: u64, timeout_ms: u64) -> Self {
        Self {
            lock_id: Uuid::new_v4(),
            holders: 1,
            version,
            created_at: now,
            unlock_timestamp: now.saturating_add(timeout_ms),
            last_used_timestamp: now,
            committed_releases: 0,
        }
    }

    // == Extend ==
    /// Adds a holder to a live lock and pushes its window out to
    /// `now + timeout_ms`. The lock id is kept.
    pub fn extend(&self, version: Option<u64>, now: u64, timeout_ms: u64) -> Self {
        let mut next = self.clone();
        next.holders = self.holders.saturating_add(1);
        next.version = max_version(self.version, version);
        next.unlock_timestamp = self.unlock_timestamp.max(now.saturating_add(timeout_ms));
        next.last_used_timestamp = now;
        next
    }

    // == Liveness ==
    /// A lock is live strictly before its unlock timestamp. Past it, the lock
    /// counts as absent whatever its holder count.
    pub fn is_live(&self, now: u64) -> bool {
        now < self.unlock_timestamp
    }

    /// True if a transaction that started at `tx_timestamp` falls inside the
    /// lock window.
    pub fn covers(&self, tx_timestamp: u64) -> bool {
        tx_timestamp < self.unlock_timestamp
    }

    /// True if `other` is a token for this very acquisition.
    pub fn is_same(&self, other: &SoftLock) -> bool {
        self.lock_id == other.lock_id
    }

    /// True if `version` may be written under this lock.
    pub fn accepts_version(&self, version: Option<u64>) -> bool {
        match (self.version, version) {
            (Some(locked), Some(incoming)) => incoming >= locked,
            _ => true,
        }
    }

    // == Release ==
    /// Drops one holder.
    ///
    /// The last holder may write only if it committed, the window is still
    /// open, and no earlier holder of this lock released after a commit of
    /// its own (two committed writers under one lock have no known order).
    pub fn release(&self, now: u64, committed: bool) -> Release {
        if self.holders <= 1 {
            if committed && self.is_live(now) && self.committed_releases == 0 {
                Release::Write
            } else {
                Release::Clear
            }
        } else {
            let mut next = self.clone();
            next.holders -= 1;
            next.last_used_timestamp = now;
            if committed {
                next.committed_releases = next.committed_releases.saturating_add(1);
            }
            Release::Held(next)
        }
    }
}

fn max_version(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
