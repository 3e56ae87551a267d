//! Song domain types

use super::ids::{AlbumId, SongId};
use serde::{Deserialize, Serialize};

/// Full song record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub performer: String,
    pub duration: Option<i32>,
    pub album_id: Option<AlbumId>,
}

/// Compact song projection used in listings and playlist snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSummary {
    pub id: SongId,
    pub title: String,
    pub performer: String,
}

/// Data for creating a new song
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSong {
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub performer: String,
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default)]
    pub album_id: Option<AlbumId>,
}

/// Replacement data for an existing song
pub type UpdateSong = CreateSong;

/// Optional case-insensitive substring filters for song listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SongFilter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub performer: Option<String>,
}
