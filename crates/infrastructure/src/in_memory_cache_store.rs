use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use warden_application::CacheStore;
use warden_core::AppResult;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

const DEFAULT_SWEEP_INTERVAL: usize = 1024;

/// Process-local cache store with per-key expiry.
///
/// Expired entries are evicted when read, and every `sweep_interval` writes
/// the whole map is swept so keys that are never read again do not pile up.
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    writes: AtomicUsize,
    sweep_interval: usize,
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }
}

impl InMemoryCacheStore {
    /// Creates an empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache that sweeps expired entries every `writes` writes.
    #[must_use]
    pub fn with_sweep_interval(writes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            writes: AtomicUsize::new(0),
            sweep_interval: writes.max(1),
        }
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(key);
        }

        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u32) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        let mut entries = self.entries.write().await;
        let write = self.writes.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        if write % self.sweep_interval == 0 {
            let before = entries.len();
            entries.retain(|_, entry| entry.expires_at > now);
            debug!(evicted = before - entries.len(), "swept expired cache entries");
        }
        entries.insert(key.to_owned(), CacheEntry { value, expires_at });

        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
