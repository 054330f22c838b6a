//! Expiring response cache shared by the analyze and enhance handlers.
//!
//! Duplicate concurrent computations for one key are allowed; the last writer
//! wins and both values are equivalent.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sha2::{Digest, Sha256};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Bounded TTL cache keyed by request fingerprints.
///
/// Entries expire `ttl` after their last insert and read as absent from then on.
/// Past `max_entries` the least useful entries are evicted.
pub struct ExpiringCache<V> {
    inner: Cache<String, V>,
}

impl<V> ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: String, value: V) {
        self.inner.insert(key, value).await;
    }

    /// Applies pending evictions and expirations now instead of on the next write.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }

    /// Approximate entry count; exact right after `run_pending_tasks`.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

/// `"{operation}:{role}:{hash}"` where `hash` is the first 16 hex characters of
/// SHA-256 over the normalized source text and the guidance report.
pub fn fingerprint(operation: &str, role: &str, source_text: &str, guidance: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_text.as_bytes());
    hasher.update([0u8]);
    hasher.update(guidance.unwrap_or_default().as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{operation}:{}:{}", role.trim().to_lowercase(), &digest[..16])
}

/// Runs `cache` maintenance every `interval` until `shutdown` flips to `true` or
/// its sender is dropped.
pub fn spawn_sweeper<V>(
    name: &'static str,
    cache: Arc<ExpiringCache<V>>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let before = cache.entry_count();
                    cache.run_pending_tasks().await;
                    let after = cache.entry_count();
                    if after < before {
                        debug!("{name} cache sweep removed {} entries, {after} remain", before - after);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("{name} cache sweeper stopped");
    })
}
