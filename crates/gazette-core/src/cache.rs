//! In-memory cache-aside store for canonical upstream results.
//!
//! Values are kept as serialized JSON so one store can hold every data family.
//! The lock is held only for the map operation itself, never across a fetch:
//! concurrent misses on the same key may each run their own fetch. Upstream
//! reads are idempotent, so the duplicated work is accepted.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data_source::SourceError;

/// Defines the behavior of the cache for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Read from the cache if a non-expired entry is present;
    /// otherwise, fetch and write the result to the cache. (Default)
    #[default]
    Use,
    /// Always fetch, bypassing any cached entry, and write the new result.
    Refresh,
    /// Always fetch and do not read from or write to the cache.
    Bypass,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<String, CacheEntry>,
    default_ttl: Duration,
}

impl CacheInner {
    fn new(default_ttl: Duration) -> Self {
        Self {
            map: HashMap::new(),
            default_ttl,
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).and_then(|entry| {
            if Instant::now() < entry.expires_at {
                Some(entry.body.clone())
            } else {
                None
            }
        })
    }

    fn put(&mut self, key: String, body: String, ttl_override: Option<Duration>) {
        let ttl = ttl_override.unwrap_or(self.default_ttl);
        let expires_at = Instant::now() + ttl;
        self.map.insert(key, CacheEntry { body, expires_at });
    }

    fn clear_expired(&mut self) {
        let now = Instant::now();
        self.map.retain(|_, entry| entry.expires_at > now);
    }
}

/// Thread-safe in-memory cache with per-entry TTL.
#[derive(Debug, Clone)]
pub struct CacheStore {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::with_default_ttl()
    }
}

impl CacheStore {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner::new(default_ttl))),
        }
    }

    /// Cache store with a default TTL of 10 minutes.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(600))
    }

    /// A store that never keeps anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Raw cached body for `key` if present and unexpired.
    pub async fn get(&self, key: &str) -> Option<String> {
        let store = self.inner.read().await;
        store.get(key)
    }

    /// Stores `body` under `key`, replacing any previous entry, and evicts
    /// every expired entry so date-keyed results do not pile up.
    ///
    /// No-op when the store is disabled.
    pub async fn put(&self, key: String, body: String, ttl_override: Option<Duration>) {
        let mut store = self.inner.write().await;

        if store.default_ttl == Duration::ZERO {
            return;
        }

        store.clear_expired();
        store.put(key, body, ttl_override);
    }

    /// Returns the cached value for `key`, or runs `fetch` and caches its result.
    ///
    /// Failures from `fetch` are propagated and never cached.
    pub async fn get_or_fetch<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<T, SourceError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        self.get_or_fetch_with_mode(key, ttl, CacheMode::Use, fetch)
            .await
    }

    pub async fn get_or_fetch_with_mode<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        mode: CacheMode,
        fetch: F,
    ) -> Result<T, SourceError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        if mode == CacheMode::Use {
            if let Some(body) = self.get(key).await {
                match serde_json::from_str(&body) {
                    Ok(value) => {
                        debug!(key, "cache hit");
                        return Ok(value);
                    }
                    Err(error) => warn!(key, %error, "discarding undecodable cache entry"),
                }
            }
        }

        debug!(key, ?mode, "cache miss; fetching");
        let value = fetch().await?;

        if mode != CacheMode::Bypass {
            match serde_json::to_string(&value) {
                Ok(body) => self.put(key.to_owned(), body, Some(ttl)).await,
                Err(error) => warn!(key, %error, "result not cacheable"),
            }
        }

        Ok(value)
    }

    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        store.clear_expired();
    }

    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        store.map.clear();
    }

    /// Number of entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn is_disabled(&self) -> bool {
        let store = self.inner.read().await;
        store.default_ttl == Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_cache_store_basic_operations() {
        let cache = CacheStore::new(Duration::from_secs(1));

        assert!(cache.get("key1").await.is_none());

        cache.put("key1".to_string(), "value1".to_string(), None).await;
        assert_eq!(cache.get("key1").await, Some("value1".to_string()));

        cache.put("key1".to_string(), "value2".to_string(), None).await;
        assert_eq!(cache.get("key1").await, Some("value2".to_string()));
    }

    #[tokio::test]
    async fn test_second_fetch_within_ttl_is_served_from_cache() {
        let cache = CacheStore::with_default_ttl();
        let calls = AtomicU32::new(0);

        for _ in 0..2 {
            let value: u32 = cache
                .get_or_fetch("fx:latest:USD:ALL", Duration::from_secs(60), || async {
                    Ok(calls.fetch_add(1, Ordering::SeqCst) + 10)
                })
                .await
                .expect("fetch should succeed");
            assert_eq!(value, 10);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_runs_again_after_expiry() {
        let cache = CacheStore::with_default_ttl();
        let calls = AtomicU32::new(0);
        let ttl = Duration::from_millis(100);

        let fetch = || async { Ok::<_, SourceError>(calls.fetch_add(1, Ordering::SeqCst)) };

        assert_eq!(cache.get_or_fetch("k", ttl, fetch).await, Ok(0));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(cache.get_or_fetch("k", ttl, fetch).await, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = CacheStore::with_default_ttl();
        let calls = AtomicU32::new(0);

        let first: Result<u32, _> = cache
            .get_or_fetch("k", Duration::from_secs(60), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(SourceError::transient("upstream down"))
            })
            .await;
        assert!(first.is_err());
        assert!(cache.is_empty().await);

        let second: Result<u32, _> = cache
            .get_or_fetch("k", Duration::from_secs(60), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            })
            .await;
        assert_eq!(second, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refresh_skips_read_but_writes() {
        let cache = CacheStore::with_default_ttl();
        cache.put("k".to_string(), "1".to_string(), None).await;

        let value: u32 = cache
            .get_or_fetch_with_mode("k", Duration::from_secs(60), CacheMode::Refresh, || async {
                Ok(2)
            })
            .await
            .expect("fetch should succeed");

        assert_eq!(value, 2);
        assert_eq!(cache.get("k").await, Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_bypass_neither_reads_nor_writes() {
        let cache = CacheStore::with_default_ttl();

        let value: u32 = cache
            .get_or_fetch_with_mode("k", Duration::from_secs(60), CacheMode::Bypass, || async {
                Ok(3)
            })
            .await
            .expect("fetch should succeed");

        assert_eq!(value, 3);
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_cache_clear_expired() {
        let cache = CacheStore::new(Duration::from_millis(100));

        cache.put("key1".to_string(), "value1".to_string(), None).await;
        cache.put("key2".to_string(), "value2".to_string(), None).await;
        assert_eq!(cache.len().await, 2);

        tokio::time::sleep(Duration::from_millis(150)).await;
        cache.clear_expired().await;

        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_cache_disabled() {
        let cache = CacheStore::disabled();

        assert!(cache.is_disabled().await);

        cache.put("key1".to_string(), "value1".to_string(), None).await;
        assert!(cache.get("key1").await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_cache_clear_all() {
        let cache = CacheStore::new(Duration::from_secs(60));

        cache.put("key1".to_string(), "value1".to_string(), None).await;
        cache.put("key2".to_string(), "value2".to_string(), None).await;
        cache.clear().await;

        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_writes_evict_expired_entries() {
        // Given: An entry for yesterday's date that has since expired
        let cache = CacheStore::with_default_ttl();
        cache
            .put(
                "dayfacts:pt:2025-03-07".to_string(),
                "[]".to_string(),
                Some(Duration::from_millis(50)),
            )
            .await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        // When: Today's entry is written
        cache
            .put("dayfacts:pt:2025-03-08".to_string(), "[]".to_string(), None)
            .await;

        // Then: Only the live entry remains
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("dayfacts:pt:2025-03-08").await.is_some());
    }
}
