//! Expiry Cleanup Task
//!
//! Background task that periodically drops expired soft locks and values
//! from every region store.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::RegionCache;

/// Spawns a background task that sweeps `stores` every `interval`.
///
/// Reads already treat expired entries as absent; the sweep only reclaims
/// their memory. A failing store is logged and retried on the next tick.
///
/// Returns the task handle so shutdown can abort it.
pub fn spawn_cleanup_task<C, V>(stores: Vec<Arc<C>>, interval: Duration) -> JoinHandle<()>
where
    C: RegionCache<V> + 'static,
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            regions = stores.len(),
            interval_ms = interval.as_millis() as u64,
            "Starting expiry cleanup task"
        );

        loop {
            tokio::time::sleep(interval).await;

            for store in &stores {
                match store.cleanup_expired().await {
                    Ok(0) => debug!(region = %store.name(), "cleanup: no expired entries found"),
                    Ok(removed) => {
                        info!(region = %store.name(), removed, "cleanup: removed expired entries")
                    }
                    Err(err) => warn!(region = %store.name(), error = %err, "cleanup failed"),
                }
            }
        }
    })
}
