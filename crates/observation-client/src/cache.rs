//! Response cache with per-entry TTL
//!
//! The gateway only talks to [`CacheStore`], so an application can swap the
//! in-memory default for a persistent or shared store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use serde_json::Value;

/// Default TTL for cached responses (1 hour)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Longest TTL an entry can get; longer requests are clamped to it
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Key/value store with per-entry expiry
///
/// Implementations must never return an entry past its expiry, and `has`
/// must agree with `get`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;
    async fn set(&self, key: &str, value: Value, ttl: Duration);
    async fn delete(&self, key: &str);
    async fn has(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    /// Store `value` only when no live entry exists for `key`. Returns
    /// whether it was stored.
    ///
    /// The default is a `has` check followed by `set`; stores that can do
    /// both atomically should override it.
    async fn set_if_absent(&self, key: &str, value: Value, ttl: Duration) -> bool {
        if self.has(key).await {
            return false;
        }
        self.set(key, value, ttl).await;
        true
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: Value, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            expires_at: now.checked_add(ttl.min(MAX_CACHE_TTL)).unwrap_or(now),
        }
    }
}

struct EntryExpiry;

impl Expiry<String, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        created_at: Instant,
    ) -> Option<Duration> {
        Some(value.expires_at.saturating_duration_since(created_at))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.expires_at.saturating_duration_since(updated_at))
    }
}

/// In-memory store backed by a moka async cache
pub struct InMemoryCache {
    entries: Cache<String, CacheEntry>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        // Entries leave only through their TTL or `delete`
        let entries = Cache::builder().expire_after(EntryExpiry).build();

        Self { entries }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let entry = self.entries.get(key).await?;
        if Instant::now() < entry.expires_at {
            return Some(entry.value);
        }

        // Expired but not yet reclaimed by moka
        self.entries.invalidate(key).await;
        None
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl))
            .await;
    }

    async fn delete(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    async fn set_if_absent(&self, key: &str, value: Value, ttl: Duration) -> bool {
        self.entries
            .entry(key.to_string())
            .or_insert_with(async move { CacheEntry::new(value, ttl) })
            .await
            .is_fresh()
    }
}

/// Client-level cache configuration
#[derive(Clone)]
pub struct CacheOptions {
    /// When false, no call is cached regardless of its own options
    pub enabled: bool,
    pub default_ttl: Duration,
    pub store: Arc<dyn CacheStore>,
}

impl CacheOptions {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = store;
        self
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: DEFAULT_CACHE_TTL,
            store: Arc::new(InMemoryCache::new()),
        }
    }
}

impl std::fmt::Debug for CacheOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheOptions")
            .field("enabled", &self.enabled)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_then_get_returns_value() {
        let cache = InMemoryCache::new();
        cache
            .set("https://x.test/api/v1/countries/", json!({"count": 2}), Duration::from_secs(60))
            .await;

        assert_eq!(
            cache.get("https://x.test/api/v1/countries/").await,
            Some(json!({"count": 2}))
        );
        assert!(cache.has("https://x.test/api/v1/countries/").await);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = InMemoryCache::new();
        cache.set("k", json!("v"), Duration::from_millis(50)).await;
        assert!(cache.has("k").await);

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(cache.get("k").await, None);
        assert!(!cache.has("k").await);
    }

    #[tokio::test]
    async fn test_delete_removes_entry() {
        let cache = InMemoryCache::new();
        cache.set("k", json!(1), Duration::from_secs(60)).await;
        cache.delete("k").await;
        assert!(!cache.has("k").await);
    }

    #[tokio::test]
    async fn test_missing_key() {
        let cache = InMemoryCache::new();
        assert_eq!(cache.get("nope").await, None);
        assert!(!cache.has("nope").await);
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_entry() {
        let cache = InMemoryCache::new();
        cache.set("k", json!(1), Duration::from_secs(60)).await;
        cache.set("k", json!(2), Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some(json!(2)));
    }

    #[tokio::test]
    async fn test_set_if_absent_keeps_first_value() {
        let cache = InMemoryCache::new();
        assert!(cache.set_if_absent("k", json!(1), Duration::from_secs(60)).await);
        assert!(!cache.set_if_absent("k", json!(2), Duration::from_secs(60)).await);
        assert_eq!(cache.get("k").await, Some(json!(1)));
    }

    #[tokio::test]
    async fn test_set_if_absent_replaces_expired_entry() {
        let cache = InMemoryCache::new();
        cache.set("k", json!(1), Duration::from_millis(30)).await;
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(cache.set_if_absent("k", json!(2), Duration::from_secs(60)).await);
        assert_eq!(cache.get("k").await, Some(json!(2)));
    }

    #[tokio::test]
    async fn test_default_set_if_absent_uses_has() {
        struct MapStore(std::sync::Mutex<std::collections::HashMap<String, Value>>);

        #[async_trait]
        impl CacheStore for MapStore {
            async fn get(&self, key: &str) -> Option<Value> {
                self.0.lock().unwrap().get(key).cloned()
            }
            async fn set(&self, key: &str, value: Value, _ttl: Duration) {
                self.0.lock().unwrap().insert(key.to_string(), value);
            }
            async fn delete(&self, key: &str) {
                self.0.lock().unwrap().remove(key);
            }
        }

        let store = MapStore(Default::default());
        assert!(store.set_if_absent("k", json!("a"), Duration::from_secs(1)).await);
        assert!(!store.set_if_absent("k", json!("b"), Duration::from_secs(1)).await);
        assert_eq!(store.get("k").await, Some(json!("a")));
    }

    #[tokio::test]
    async fn test_entries_are_not_evicted_by_count() {
        let cache = InMemoryCache::new();
        for i in 0..12_000 {
            cache.set(&format!("k{i}"), json!(i), Duration::from_secs(3600)).await;
        }
        cache.entries.run_pending_tasks().await;

        let mut live = 0;
        for i in 0..12_000 {
            if cache.has(&format!("k{i}")).await {
                live += 1;
            }
        }
        assert_eq!(live, 12_000);
    }

    #[tokio::test]
    async fn test_huge_ttl_is_clamped() {
        let cache = InMemoryCache::new();
        cache.set("k", json!("forever"), Duration::MAX).await;
        assert_eq!(cache.get("k").await, Some(json!("forever")));

        assert!(!cache.set_if_absent("k", json!("other"), Duration::MAX).await);
    }

    #[test]
    fn test_cache_options_defaults() {
        let options = CacheOptions::default();
        assert!(options.enabled);
        assert_eq!(options.default_ttl, Duration::from_secs(3600));
        assert!(!CacheOptions::disabled().enabled);
    }
}
