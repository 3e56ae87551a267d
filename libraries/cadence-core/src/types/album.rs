//! Album domain types

use super::ids::AlbumId;
use super::song::SongSummary;
use serde::{Deserialize, Serialize};

/// Album record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    pub year: i32,
    pub cover_url: Option<String>,
}

/// Album with the songs that reference it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDetail {
    pub id: AlbumId,
    pub name: String,
    pub year: i32,
    pub cover_url: Option<String>,
    pub songs: Vec<SongSummary>,
}

/// Data for creating a new album
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAlbum {
    pub name: String,
    pub year: i32,
}

/// Replacement data for an existing album
pub type UpdateAlbum = CreateAlbum;

/// Like count of an album and where it was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeCount {
    pub likes: i64,
    /// `true` when served from the side cache
    #[serde(skip)]
    pub from_cache: bool,
}
