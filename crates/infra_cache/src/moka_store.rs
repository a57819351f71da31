//! Moka-based cache store
//!
//! Provides process-local caching using the Moka library. Expiration is
//! decided per entry by [`SlidingAbsoluteExpiry`], which reads the policy
//! stored alongside the value:
//!
//! - on write the entry lives for `min(sliding, absolute)`
//! - on each read the entry lives for `min(sliding, absolute - age)`
//!
//! Prefix removal relies on Moka invalidation closures, so entries matching
//! the prefix stop being returned as soon as the call completes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use tracing::{debug, warn};

use core_kernel::{
    CacheError, CacheStore, ExpirationPolicy, HealthCheckResult, HealthCheckable,
};

use crate::config::CacheSettings;

/// A cached value together with the policy it was written with
#[derive(Debug, Clone)]
struct CacheEntry {
    bytes: Arc<[u8]>,
    policy: ExpirationPolicy,
    written_at: Instant,
}

/// Per-entry expiry combining a sliding window and an absolute ceiling
struct SlidingAbsoluteExpiry;

impl Expiry<String, CacheEntry> for SlidingAbsoluteExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.policy.ttl_on_write()
    }

    fn expire_after_read(
        &self,
        _key: &String,
        value: &CacheEntry,
        read_at: Instant,
        _duration_until_expiry: Option<Duration>,
        _last_modified_at: Instant,
    ) -> Option<Duration> {
        value
            .policy
            .ttl_on_read(read_at.saturating_duration_since(value.written_at))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.policy.ttl_on_write()
    }
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

/// Moka-backed implementation of [`CacheStore`]
#[derive(Clone)]
pub struct MokaCacheStore {
    cache: Cache<String, CacheEntry>,
    probe_ttl: Duration,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl MokaCacheStore {
    /// Creates a new store sized by the settings
    pub fn new(settings: CacheSettings) -> Self {
        tracing::info!(
            max_capacity = settings.max_capacity,
            "Initializing in-process cache"
        );

        let cache = Cache::builder()
            .max_capacity(settings.max_capacity)
            .expire_after(SlidingAbsoluteExpiry)
            .support_invalidation_closures()
            .build();

        Self {
            cache,
            probe_ttl: Duration::from_millis(settings.health_probe_ttl_ms),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns hit/miss counters and the approximate entry count
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.entry_count(),
        }
    }
}

impl Default for MokaCacheStore {
    fn default() -> Self {
        Self::new(CacheSettings::default())
    }
}

impl std::fmt::Debug for MokaCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheStore")
            .field("stats", &self.stats())
            .finish()
    }
}

#[async_trait]
impl CacheStore for MokaCacheStore {
    async fn get_raw(&self, key: &str) -> Option<Vec<u8>> {
        match self.cache.get(key).await {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key, "Cache hit");
                Some(entry.bytes.to_vec())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key, "Cache miss");
                None
            }
        }
    }

    async fn set_raw(&self, key: &str, value: Vec<u8>, policy: ExpirationPolicy) {
        let entry = CacheEntry {
            bytes: Arc::from(value),
            policy,
            written_at: Instant::now(),
        };
        self.cache.insert(key.to_string(), entry).await;
    }

    async fn remove(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    async fn remove_by_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        let prefix = prefix.to_string();
        self.cache
            .invalidate_entries_if(move |key, _| {
                key.as_bytes()
                    .get(..prefix.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
            })
            .map(|_| ())
            .map_err(|e| {
                warn!("Failed to register prefix invalidation: {}", e);
                CacheError::Backend(e.to_string())
            })
    }
}

#[async_trait]
impl HealthCheckable for MokaCacheStore {
    /// Writes a probe, reads it back, then waits past its lifetime and
    /// verifies that it expired.
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let key = format!("__health_probe_{}", uuid::Uuid::new_v4());
        let payload = b"ok".to_vec();

        self.set_raw(&key, payload.clone(), ExpirationPolicy::absolute_only(self.probe_ttl))
            .await;

        let read_back = self.cache.get(&key).await;
        if read_back.as_ref().map(|e| e.bytes.as_ref()) != Some(payload.as_slice()) {
            return HealthCheckResult::unhealthy(
                "moka-cache",
                start.elapsed().as_millis() as u64,
                "probe value could not be read back",
            );
        }

        tokio::time::sleep(self.probe_ttl + Duration::from_millis(100)).await;

        let expired = self.cache.get(&key).await.is_none();
        let latency_ms = start.elapsed().as_millis() as u64;
        if expired {
            HealthCheckResult::healthy("moka-cache", latency_ms)
        } else {
            self.cache.invalidate(&key).await;
            HealthCheckResult::unhealthy("moka-cache", latency_ms, "probe entry did not expire")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get_raw() {
        let store = MokaCacheStore::default();
        store
            .set_raw("Owner_1", vec![1, 2, 3], ExpirationPolicy::entity())
            .await;

        assert_eq!(store.get_raw("Owner_1").await, Some(vec![1, 2, 3]));
        assert_eq!(store.get_raw("Owner_2").await, None);

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_remove_single_key() {
        let store = MokaCacheStore::default();
        store.set_raw("AllOwners", vec![1], ExpirationPolicy::default()).await;
        store.remove("AllOwners").await;
        assert!(store.get_raw("AllOwners").await.is_none());
    }
}
