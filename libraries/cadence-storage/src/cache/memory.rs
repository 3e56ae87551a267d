//! In-process cache stores

use async_trait::async_trait;
use cadence_core::{CacheStore, CadenceError, Result};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry {
    value: String,
    expires_at: Instant,
}

/// Bounded LRU cache with per-entry expiry
///
/// Expired entries are dropped lazily on access; the LRU bound keeps memory
/// flat regardless of how many keys are never read again.
pub struct MemoryCache {
    entries: Mutex<LruCache<String, Entry>>,
}

impl MemoryCache {
    /// Create a cache holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of entries currently held, expired ones included
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LruCache<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| CadenceError::cache("memory cache lock poisoned"))
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.lock()?;
        let now = Instant::now();

        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
        }

        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut entries = self.lock()?;
        entries.put(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.lock()?.pop(key);
        Ok(())
    }
}

/// Cache that never holds anything; every read goes to the store
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

#[async_trait]
impl CacheStore for NoCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let cache = MemoryCache::new(8);
        cache
            .set("playlist:user-1", "[]".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            cache.get("playlist:user-1").await.unwrap(),
            Some("[]".to_string())
        );
    }

    #[tokio::test]
    async fn absent_key_is_a_miss_not_an_error() {
        let cache = MemoryCache::new(8);
        assert_eq!(cache.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss_and_evicted() {
        let cache = MemoryCache::new(8);
        cache
            .set("likes:album-1", "3".to_string(), Duration::from_millis(10))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.get("likes:album-1").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn delete_twice_is_a_noop() {
        let cache = MemoryCache::new(8);
        cache
            .set("playlistSong:pl-1", "{}".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        cache.delete("playlistSong:pl-1").await.unwrap();
        cache.delete("playlistSong:pl-1").await.unwrap();

        assert_eq!(cache.get("playlistSong:pl-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn least_recently_used_entry_is_evicted_at_capacity() {
        let cache = MemoryCache::new(2);
        let ttl = Duration::from_secs(60);
        cache.set("a", "1".to_string(), ttl).await.unwrap();
        cache.set("b", "2".to_string(), ttl).await.unwrap();

        // Touch "a" so "b" becomes the eviction candidate
        cache.get("a").await.unwrap();
        cache.set("c", "3".to_string(), ttl).await.unwrap();

        assert_eq!(cache.get("a").await.unwrap(), Some("1".to_string()));
        assert_eq!(cache.get("b").await.unwrap(), None);
        assert_eq!(cache.get("c").await.unwrap(), Some("3".to_string()));
    }

    #[tokio::test]
    async fn zero_capacity_is_clamped() {
        let cache = MemoryCache::new(0);
        cache
            .set("k", "v".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn no_cache_always_misses() {
        let cache = NoCache;
        cache
            .set("k", "v".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }
}
