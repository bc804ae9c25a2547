//! Cache Module
//!
//! The backing-store side of a region: keys, stored entries, the store
//! contract and an in-memory store with TTL expiry and LRU bounding.

mod clock;
mod entry;
mod key;
mod lru;
mod stats;
mod store;

// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::{Applied, CachedValue, Entry, EntryProcessor, Mutation, Outcome};
pub use key::CacheKey;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{InMemoryRegionCache, RegionCache};

// == Public Constants ==
/// Maximum allowed key id length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
