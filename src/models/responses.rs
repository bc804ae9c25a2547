//! Response DTOs for the region API

use serde::Serialize;
use serde_json::Value;

use crate::access::{AccessType, SoftLock};
use crate::cache::CacheStats;

/// Response body for `get`. `value` is null on a miss or a fenced key.
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Option<Value>,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the write calls: `put_from_load`, `insert`, `update`,
/// `after_insert` and `after_update`.
#[derive(Debug, Clone, Serialize)]
pub struct WriteResponse {
    pub key: String,
    /// What the strategy reported: cached, accepted, or nothing to do
    pub written: bool,
}

impl WriteResponse {
    pub fn new(key: impl Into<String>, written: bool) -> Self {
        Self {
            key: key.into(),
            written,
        }
    }
}

/// Response body for `lock`. `lock` is null when the strategy does not fence.
#[derive(Debug, Clone, Serialize)]
pub struct LockResponse {
    pub key: String,
    pub lock: Option<SoftLock>,
}

impl LockResponse {
    pub fn new(key: impl Into<String>, lock: Option<SoftLock>) -> Self {
        Self {
            key: key.into(),
            lock,
        }
    }
}

/// Response body for the removal and eviction calls.
#[derive(Debug, Clone, Serialize)]
pub struct RemoveResponse {
    pub region: String,
    pub removed: usize,
}

impl RemoveResponse {
    pub fn new(region: impl Into<String>, removed: usize) -> Self {
        Self {
            region: region.into(),
            removed,
        }
    }
}

/// Response body for `GET /regions/:region/timestamp`.
#[derive(Debug, Clone, Serialize)]
pub struct TimestampResponse {
    pub region: String,
    pub timestamp: u64,
}

/// Counters of one region as reported by `GET /stats`.
#[derive(Debug, Clone, Serialize)]
pub struct RegionStats {
    pub region: String,
    pub access_type: AccessType,
    #[serde(flatten)]
    pub counters: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl RegionStats {
    pub fn new(region: impl Into<String>, access_type: AccessType, counters: CacheStats) -> Self {
        let hit_rate = counters.hit_rate();
        Self {
            region: region.into(),
            access_type,
            counters,
            hit_rate,
        }
    }
}

/// Response body for `GET /stats`, regions sorted by name.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub regions: Vec<RegionStats>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
