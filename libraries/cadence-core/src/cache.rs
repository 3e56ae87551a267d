//! Side-cache contract and key namespace
//!
//! The cache is a disposable projection of relational state. Losing an entry
//! costs latency, never correctness: every mutating repository operation
//! deletes the keys it affects before returning, and nothing ever writes a
//! derived value into the cache except a read that just computed it.

use crate::error::Result;
use crate::types::{AlbumId, PlaylistId, UserId};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Key-value store with per-entry expiry
///
/// A miss is an expected outcome and is reported as `Ok(None)`; `Err` is
/// reserved for a cache that could not be reached at all.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live entry
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store an entry that expires after `ttl`
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Remove an entry; deleting an absent key is a no-op
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Stable cache key namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Playlists a user owns or collaborates on: `playlist:<userId>`
    PlaylistsByUser(UserId),
    /// Membership snapshot: `playlistSong:<playlistId>`
    PlaylistSongs(PlaylistId),
    /// Activity log: `playlistActivity:<playlistId>`
    PlaylistActivity(PlaylistId),
    /// Like count: `likes:<albumId>`
    AlbumLikes(AlbumId),
    /// Persisted refresh token: `refreshToken:<token>`
    RefreshToken(String),
}

impl CacheKey {
    /// Staleness window for entries under this key
    ///
    /// Recoverable only; correctness comes from explicit invalidation.
    pub fn ttl(&self) -> Duration {
        match self {
            CacheKey::PlaylistsByUser(_) | CacheKey::PlaylistSongs(_) => Duration::from_secs(600),
            CacheKey::PlaylistActivity(_) => Duration::from_secs(300),
            CacheKey::AlbumLikes(_) => Duration::from_secs(1800),
            CacheKey::RefreshToken(_) => Duration::from_secs(3600),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::PlaylistsByUser(user_id) => write!(f, "playlist:{user_id}"),
            CacheKey::PlaylistSongs(playlist_id) => write!(f, "playlistSong:{playlist_id}"),
            CacheKey::PlaylistActivity(playlist_id) => {
                write!(f, "playlistActivity:{playlist_id}")
            }
            CacheKey::AlbumLikes(album_id) => write!(f, "likes:{album_id}"),
            CacheKey::RefreshToken(token) => write!(f, "refreshToken:{token}"),
        }
    }
}
