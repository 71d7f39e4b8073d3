//! TTL Sweep Task
//!
//! Background task that periodically removes expired entries from a set of
//! cache stores. Expiry is already enforced lazily on read; the sweep only
//! reclaims memory held by keys nobody reads again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a task that sweeps every store in `caches` once per interval.
///
/// Each store is locked on its own, so a sweep never holds two namespaces
/// at once. Abort the returned handle to stop the task.
pub fn spawn_cleanup_task(caches: Vec<SharedCache>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL sweep over {} stores every {} seconds",
            caches.len(),
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            for cache in &caches {
                let (namespace, removed) = {
                    let mut guard = cache.write().await;
                    let removed = guard.cleanup_expired();
                    (guard.namespace().to_string(), removed)
                };

                if removed > 0 {
                    info!("TTL sweep: removed {} expired entries from '{}'", removed, namespace);
                } else {
                    debug!("TTL sweep: nothing expired in '{}'", namespace);
                }
            }
        }
    })
}
