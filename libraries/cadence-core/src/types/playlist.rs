//! Playlist domain types

use super::ids::{PlaylistId, SongId, UserId};
use super::song::SongSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Playlist row, owned exclusively by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    /// Immutable once created
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection: playlist joined with its owner's username
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: PlaylistId,
    pub name: String,
    /// `None` only if the owner row vanished underneath the playlist
    pub username: Option<String>,
}

/// Membership snapshot: playlist header plus its member songs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistWithSongs {
    pub id: PlaylistId,
    pub name: String,
    pub username: Option<String>,
    pub songs: Vec<SongSummary>,
}

impl PlaylistWithSongs {
    /// Whether the snapshot contains the given song
    pub fn contains(&self, song_id: &SongId) -> bool {
        self.songs.iter().any(|song| &song.id == song_id)
    }
}

/// Direction of a membership transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    /// `absent -> present`
    Add,
    /// `present -> absent`
    Delete,
}

impl ActivityAction {
    /// Convert the action to its stored form
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Add => "add",
            ActivityAction::Delete => "delete",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(ActivityAction::Add),
            "delete" => Ok(ActivityAction::Delete),
            other => Err(format!("unknown playlist activity action: {other}")),
        }
    }
}

/// One audit-log entry, denormalized for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistActivity {
    pub username: Option<String>,
    /// `None` once the song itself has been deleted
    pub title: Option<String>,
    pub action: ActivityAction,
    pub time: DateTime<Utc>,
}

/// Chronological activity log of one playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistActivities {
    pub playlist_id: PlaylistId,
    pub activities: Vec<PlaylistActivity>,
}
