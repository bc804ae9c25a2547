//! Configuration Module
//!
//! Region settings and process configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

/// Default soft-lock lifetime in milliseconds
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 10_000;

/// Default entry budget per region
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

// == Region Config ==
/// Settings of one cache region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionConfig {
    /// How long a soft lock fences its key before it is ignored
    pub lock_timeout_ms: u64,
    /// Skip loads when an equal-or-newer value is already cached
    pub minimal_puts: bool,
    /// Lifetime of cached values; `None` keeps them until removed
    pub time_to_live_ms: Option<u64>,
    /// Entry budget of the region store
    pub max_entries: usize,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            minimal_puts: false,
            time_to_live_ms: None,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl RegionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lock_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn with_minimal_puts(mut self, enabled: bool) -> Self {
        self.minimal_puts = enabled;
        self
    }

    /// A zero TTL disables value expiry.
    pub fn with_time_to_live_ms(mut self, ttl_ms: u64) -> Self {
        self.time_to_live_ms = (ttl_ms > 0).then_some(ttl_ms);
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }
}

// == Process Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Settings applied to every configured region
    pub region_defaults: RegionConfig,
    /// `(region name, access type)` pairs, access types still unparsed
    pub regions: Vec<(String, String)>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    /// - `LOCK_TIMEOUT_MS` - Soft-lock lifetime (default: 10000)
    /// - `USE_MINIMAL_PUTS` - `true`/`false` (default: false)
    /// - `TIME_TO_LIVE_MS` - Value lifetime, 0 disables (default: 0)
    /// - `MAX_ENTRIES` - Entry budget per region (default: 10000)
    /// - `REGIONS` - `name=access-type` list (default: `default=read-write`)
    pub fn from_env() -> Self {
        let defaults = RegionConfig::default();
        let region_defaults = RegionConfig::new()
            .with_lock_timeout_ms(env_or("LOCK_TIMEOUT_MS", defaults.lock_timeout_ms))
            .with_minimal_puts(env_or("USE_MINIMAL_PUTS", defaults.minimal_puts))
            .with_time_to_live_ms(env_or("TIME_TO_LIVE_MS", 0))
            .with_max_entries(env_or("MAX_ENTRIES", defaults.max_entries));

        let regions = env::var("REGIONS")
            .map(|raw| parse_regions(&raw))
            .unwrap_or_else(|_| default_regions());

        Self {
            server_port: env_or("SERVER_PORT", 3000),
            cleanup_interval: env_or("CLEANUP_INTERVAL", 1),
            region_defaults,
            regions,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 1,
            region_defaults: RegionConfig::default(),
            regions: default_regions(),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn default_regions() -> Vec<(String, String)> {
    vec![("default".to_string(), "read-write".to_string())]
}

/// Parses `users=read-write, countries=read-only`. An entry without `=`
/// keeps an empty access type, which region construction rejects.
pub fn parse_regions(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item.split_once('=') {
            Some((name, access)) => (name.trim().to_string(), access.trim().to_string()),
            None => (item.to_string(), String::new()),
        })
        .collect()
}
