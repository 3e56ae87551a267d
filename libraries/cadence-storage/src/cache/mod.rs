//! Read-through / invalidation-only cache layer
//!
//! Repositories never talk to a [`CacheStore`] directly. They go through
//! [`CacheLayer`], which turns every cache failure into a miss so the caller
//! falls back to the relational store. Cache problems are logged, never
//! returned.

mod memory;

pub use memory::{MemoryCache, NoCache};

use cadence_core::{CacheKey, CacheStore};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Shared handle over the process-wide cache client
#[derive(Clone)]
pub struct CacheLayer {
    store: Arc<dyn CacheStore>,
}

impl CacheLayer {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// A layer that always misses
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoCache))
    }

    /// Read and decode a cached projection
    ///
    /// Absent, expired, unreachable and undecodable entries all come back as
    /// `None`. A malformed entry is logged so corruption stays visible, then
    /// recomputed by the caller like any other miss.
    pub async fn read<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let key = key.to_string();

        match self.store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    tracing::debug!(%key, "cache hit");
                    Some(value)
                }
                Err(e) => {
                    tracing::warn!(%key, error = %e, "malformed cache entry, recomputing");
                    None
                }
            },
            Ok(None) => {
                tracing::debug!(%key, "cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(%key, error = %e, "cache unavailable, reading from store");
                None
            }
        }
    }

    /// Store a freshly computed projection under the key's TTL
    pub async fn fill<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(%key, error = %e, "could not encode cache entry");
                return;
            }
        };

        if let Err(e) = self.store.set(&key.to_string(), raw, key.ttl()).await {
            tracing::warn!(%key, error = %e, "cache fill failed");
        }
    }

    /// Drop a key after a committed write
    pub async fn invalidate(&self, key: &CacheKey) {
        if let Err(e) = self.store.delete(&key.to_string()).await {
            tracing::warn!(%key, error = %e, "cache invalidation failed");
        }
    }

    /// Drop several keys in order
    pub async fn invalidate_all(&self, keys: impl IntoIterator<Item = CacheKey>) {
        for key in keys {
            self.invalidate(&key).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cadence_core::types::{PlaylistId, UserId};
    use cadence_core::{CadenceError, Result};
    use std::time::Duration;

    /// Cache client whose backend is gone
    struct Unreachable;

    #[async_trait]
    impl CacheStore for Unreachable {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(CadenceError::cache("connection refused"))
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<()> {
            Err(CadenceError::cache("connection refused"))
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            Err(CadenceError::cache("connection refused"))
        }
    }

    #[tokio::test]
    async fn fill_then_read_round_trips() {
        let layer = CacheLayer::new(Arc::new(MemoryCache::new(4)));
        let key = CacheKey::PlaylistsByUser(UserId::new("user-1"));

        layer.fill(&key, &vec!["a".to_string()]).await;

        let cached: Option<Vec<String>> = layer.read(&key).await;
        assert_eq!(cached, Some(vec!["a".to_string()]));
    }

    #[tokio::test]
    async fn malformed_entry_reads_as_miss() {
        let store = Arc::new(MemoryCache::new(4));
        let key = CacheKey::PlaylistSongs(PlaylistId::new("pl-1"));
        store
            .set(&key.to_string(), "{not json".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        let layer = CacheLayer::new(store);
        let cached: Option<Vec<String>> = layer.read(&key).await;
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn unreachable_cache_degrades_silently() {
        let layer = CacheLayer::new(Arc::new(Unreachable));
        let key = CacheKey::PlaylistActivity(PlaylistId::new("pl-1"));

        layer.fill(&key, &1_u32).await;
        layer.invalidate(&key).await;
        let cached: Option<u32> = layer.read(&key).await;

        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let layer = CacheLayer::new(Arc::new(MemoryCache::new(4)));
        let key = CacheKey::PlaylistSongs(PlaylistId::new("pl-1"));

        layer.fill(&key, &"snapshot").await;
        layer.invalidate(&key).await;
        layer.invalidate(&key).await;

        let cached: Option<String> = layer.read(&key).await;
        assert!(cached.is_none());
    }
}
