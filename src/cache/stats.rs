//! Cache Statistics Module
//!
//! Per-region counters kept by the store.

use serde::Serialize;

// == Cache Stats ==
/// Tracks region store activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads that found a committed value
    pub hits: u64,
    /// Reads that found nothing, a soft lock, or an expired value
    pub misses: u64,
    /// Entries stored (values and locks)
    pub puts: u64,
    /// Entries removed on request
    pub removals: u64,
    /// Entries evicted to stay within the entry budget
    pub evictions: u64,
    /// Expired locks and values dropped by the sweeper or on read
    pub expirations: u64,
    /// Current number of entries
    pub total_entries: usize,
    /// Entries currently holding a soft lock
    pub locked_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 before any read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_put(&mut self) {
        self.puts += 1;
    }

    pub fn record_removal(&mut self) {
        self.removals += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_counters() {
        let mut stats = CacheStats::new();
        stats.record_put();
        stats.record_removal();
        stats.record_eviction();
        stats.record_expirations(3);

        assert_eq!(stats.puts, 1);
        assert_eq!(stats.removals, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.expirations, 3);
    }
}
