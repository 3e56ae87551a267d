//! Cadence Core
//!
//! Platform-agnostic domain types, seams and error handling for the Cadence
//! music catalog backend.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Playlist`, `Song`, `Album`, `User`, playlist activity
//! - **Seams**: `CacheStore` (side cache) and `CollaborationResolver`
//! - **Cache Policy**: the `CacheKey` namespace and its TTLs
//! - **Error Handling**: Unified `CadenceError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use cadence_core::cache::CacheKey;
//! use cadence_core::types::{PlaylistId, UserId};
//!
//! let key = CacheKey::PlaylistsByUser(UserId::new("user-1"));
//! assert_eq!(key.to_string(), "playlist:user-1");
//! assert_eq!(key.ttl().as_secs(), 600);
//!
//! let key = CacheKey::PlaylistSongs(PlaylistId::new("pl-1"));
//! assert_eq!(key.to_string(), "playlistSong:pl-1");
//! ```

#![forbid(unsafe_code)]

pub mod cache;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use cache::{CacheKey, CacheStore};
pub use error::{CadenceError, Result, FORBIDDEN_MESSAGE};
pub use traits::CollaborationResolver;

pub use types::{
    ActivityAction, Album, AlbumDetail, AlbumId, CreateAlbum, CreateSong, CreateUser, LikeCount,
    Playlist, PlaylistActivities, PlaylistActivity, PlaylistId, PlaylistSummary,
    PlaylistWithSongs, Song, SongFilter, SongId, SongSummary, UpdateAlbum, UpdateSong, User,
    UserId,
};
