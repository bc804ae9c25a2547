//! API Handlers
//!
//! HTTP request handlers exposing each region's access strategy. Cached
//! payloads are JSON values.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::access::AccessStrategy;
use crate::cache::{CacheKey, InMemoryRegionCache, RegionCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    AfterWriteRequest, GetRequest, GetResponse, HealthResponse, InsertRequest, KeyRef, KeyRequest,
    LockRequest, LockResponse, PutFromLoadRequest, RegionStats, RemoveResponse, StatsResponse,
    TimestampResponse, UnlockRequest, UpdateRequest, WriteResponse,
};
use crate::region::Region;

/// Strategy type served over HTTP.
pub type JsonStrategy = AccessStrategy<InMemoryRegionCache<Value>, Value>;

/// Application state shared across all handlers.
///
/// Regions are fixed at startup, so the map itself needs no lock; each
/// store synchronizes its own entries.
#[derive(Clone)]
pub struct AppState {
    pub regions: Arc<HashMap<String, JsonStrategy>>,
}

impl AppState {
    /// Registers strategies under their region names. Duplicate or empty
    /// names are a configuration error.
    pub fn new(strategies: impl IntoIterator<Item = JsonStrategy>) -> Result<Self> {
        let mut regions = HashMap::new();
        for strategy in strategies {
            let name = strategy.region_name().to_string();
            if name.is_empty() {
                return Err(CacheError::Configuration(
                    "region name cannot be empty".to_string(),
                ));
            }
            if regions.contains_key(&name) {
                return Err(CacheError::Configuration(format!(
                    "region '{}' is configured twice",
                    name
                )));
            }
            regions.insert(name, strategy);
        }

        Ok(Self {
            regions: Arc::new(regions),
        })
    }

    /// Builds one in-memory region per configured `(name, access type)` pair.
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.regions.is_empty() {
            return Err(CacheError::Configuration(
                "no regions configured".to_string(),
            ));
        }

        let mut strategies = Vec::with_capacity(config.regions.len());
        for (name, access_type) in &config.regions {
            let region: Region<InMemoryRegionCache<Value>, Value> =
                Region::in_memory(name.clone(), config.region_defaults.clone());
            strategies.push(region.build_access_strategy_named(access_type)?);
        }

        let state = Self::new(strategies)?;
        info!(regions = state.regions.len(), "regions initialized");
        Ok(state)
    }

    pub fn region(&self, name: &str) -> Result<&JsonStrategy> {
        self.regions
            .get(name)
            .ok_or_else(|| CacheError::RegionNotFound(name.to_string()))
    }

    /// Backing stores of every region, for the expiry sweeper.
    pub fn stores(&self) -> Vec<Arc<InMemoryRegionCache<Value>>> {
        self.regions
            .values()
            .map(|strategy| strategy.cache().clone())
            .collect()
    }
}

fn checked_key(key: &KeyRef) -> Result<CacheKey> {
    match key.validate() {
        Some(error_msg) => Err(CacheError::InvalidRequest(error_msg)),
        None => Ok(key.cache_key()),
    }
}

// == Reads and Loads ==

/// Handler for POST /regions/:region/get
pub async fn get_handler(
    State(state): State<AppState>,
    Path(region): Path<String>,
    Json(req): Json<GetRequest>,
) -> Result<Json<GetResponse>> {
    let strategy = state.region(&region)?;
    let key = checked_key(&req.key)?;
    let tx_timestamp = req
        .tx_timestamp
        .unwrap_or_else(|| strategy.next_timestamp());

    let value = strategy.get(&key, tx_timestamp).await;
    Ok(Json(GetResponse::new(key.to_string(), value)))
}

/// Handler for POST /regions/:region/put_from_load
pub async fn put_from_load_handler(
    State(state): State<AppState>,
    Path(region): Path<String>,
    Json(req): Json<PutFromLoadRequest>,
) -> Result<Json<WriteResponse>> {
    let strategy = state.region(&region)?;
    let key = checked_key(&req.key)?;
    let tx_timestamp = req
        .tx_timestamp
        .unwrap_or_else(|| strategy.next_timestamp());

    let written = strategy
        .put_from_load(
            &key,
            req.value,
            tx_timestamp,
            req.version,
            req.minimal_put_override,
        )
        .await;
    Ok(Json(WriteResponse::new(key.to_string(), written)))
}

// == Transactional Writes ==

/// Handler for POST /regions/:region/insert
pub async fn insert_handler(
    State(state): State<AppState>,
    Path(region): Path<String>,
    Json(req): Json<InsertRequest>,
) -> Result<Json<WriteResponse>> {
    let strategy = state.region(&region)?;
    let key = checked_key(&req.key)?;

    let written = strategy.insert(&key, req.value, req.version).await?;
    Ok(Json(WriteResponse::new(key.to_string(), written)))
}

/// Handler for POST /regions/:region/update
///
/// Read-only regions answer 409.
pub async fn update_handler(
    State(state): State<AppState>,
    Path(region): Path<String>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<WriteResponse>> {
    let strategy = state.region(&region)?;
    let key = checked_key(&req.key)?;

    let written = strategy
        .update(&key, req.value, req.version, req.previous_version)
        .await?;
    Ok(Json(WriteResponse::new(key.to_string(), written)))
}

/// Handler for POST /regions/:region/lock
pub async fn lock_handler(
    State(state): State<AppState>,
    Path(region): Path<String>,
    Json(req): Json<LockRequest>,
) -> Result<Json<LockResponse>> {
    let strategy = state.region(&region)?;
    let key = checked_key(&req.key)?;

    let lock = strategy.lock(&key, req.version).await?;
    Ok(Json(LockResponse::new(key.to_string(), lock)))
}

/// Handler for POST /regions/:region/unlock
pub async fn unlock_handler(
    State(state): State<AppState>,
    Path(region): Path<String>,
    Json(req): Json<UnlockRequest>,
) -> Result<Json<WriteResponse>> {
    let strategy = state.region(&region)?;
    let key = checked_key(&req.key)?;

    strategy.unlock(&key, req.lock.as_ref()).await?;
    Ok(Json(WriteResponse::new(key.to_string(), false)))
}

/// Handler for POST /regions/:region/after_insert
pub async fn after_insert_handler(
    State(state): State<AppState>,
    Path(region): Path<String>,
    Json(req): Json<AfterWriteRequest>,
) -> Result<Json<WriteResponse>> {
    let strategy = state.region(&region)?;
    let key = checked_key(&req.key)?;

    let written = strategy
        .after_insert(&key, req.value, req.version, req.lock.as_ref(), req.committed)
        .await?;
    Ok(Json(WriteResponse::new(key.to_string(), written)))
}

/// Handler for POST /regions/:region/after_update
pub async fn after_update_handler(
    State(state): State<AppState>,
    Path(region): Path<String>,
    Json(req): Json<AfterWriteRequest>,
) -> Result<Json<WriteResponse>> {
    let strategy = state.region(&region)?;
    let key = checked_key(&req.key)?;

    let written = strategy
        .after_update(&key, req.value, req.version, req.lock.as_ref(), req.committed)
        .await?;
    Ok(Json(WriteResponse::new(key.to_string(), written)))
}

// == Removal and Eviction ==

/// Handler for POST /regions/:region/remove
pub async fn remove_handler(
    State(state): State<AppState>,
    Path(region): Path<String>,
    Json(req): Json<KeyRequest>,
) -> Result<Json<RemoveResponse>> {
    let strategy = state.region(&region)?;
    let key = checked_key(&req.key)?;

    let removed = strategy.remove(&key).await?;
    Ok(Json(RemoveResponse::new(region, usize::from(removed))))
}

/// Handler for POST /regions/:region/evict
pub async fn evict_handler(
    State(state): State<AppState>,
    Path(region): Path<String>,
    Json(req): Json<KeyRequest>,
) -> Result<Json<RemoveResponse>> {
    let strategy = state.region(&region)?;
    let key = checked_key(&req.key)?;

    let evicted = strategy.evict(&key).await?;
    Ok(Json(RemoveResponse::new(region, usize::from(evicted))))
}

/// Handler for POST /regions/:region/remove_all
pub async fn remove_all_handler(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<RemoveResponse>> {
    let removed = state.region(&region)?.remove_all().await?;
    Ok(Json(RemoveResponse::new(region, removed)))
}

/// Handler for POST /regions/:region/evict_all
pub async fn evict_all_handler(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<RemoveResponse>> {
    let evicted = state.region(&region)?.evict_all().await?;
    Ok(Json(RemoveResponse::new(region, evicted)))
}

// == Introspection ==

/// Handler for GET /regions/:region/timestamp
pub async fn timestamp_handler(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<TimestampResponse>> {
    let timestamp = state.region(&region)?.next_timestamp();
    Ok(Json(TimestampResponse { region, timestamp }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let mut names: Vec<&String> = state.regions.keys().collect();
    names.sort();

    let mut regions = Vec::with_capacity(names.len());
    for name in names {
        let strategy = &state.regions[name];
        let counters = strategy.cache().stats().await;
        regions.push(RegionStats::new(name.clone(), strategy.access_type(), counters));
    }

    Json(StatsResponse { regions })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
