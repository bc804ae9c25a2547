//! Region Cache - soft-lock access strategies for transactional cache regions
//!
//! Read-only, non-strict read-write and read-write access over a shared
//! key-value store, with an HTTP service exposing configured regions.

pub mod access;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod region;
pub mod tasks;

pub use access::{AccessStrategy, AccessType, SoftLock};
pub use api::AppState;
pub use cache::{CacheKey, InMemoryRegionCache, RegionCache};
pub use config::{Config, RegionConfig};
pub use error::{CacheError, Result};
pub use region::Region;
pub use tasks::spawn_cleanup_task;
