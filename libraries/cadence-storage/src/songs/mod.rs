//! Song catalog

use crate::cache::CacheLayer;
use crate::playlists::playlists_referencing_song;
use cadence_core::{
    error::Result,
    types::{
        AlbumId, CreateSong, PlaylistId, Song, SongFilter, SongId, SongSummary, UpdateSong,
    },
    CacheKey, CadenceError,
};
use chrono::Utc;
use sqlx::{FromRow, SqlitePool};

#[derive(FromRow)]
struct SongRow {
    id: SongId,
    title: String,
    year: i64,
    genre: String,
    performer: String,
    duration: Option<i64>,
    album_id: Option<AlbumId>,
}

impl From<SongRow> for Song {
    fn from(row: SongRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            year: row.year as i32,
            genre: row.genre,
            performer: row.performer,
            duration: row.duration.map(|d| d as i32),
            album_id: row.album_id,
        }
    }
}

#[derive(Clone)]
pub struct SongRepository {
    pool: SqlitePool,
    cache: CacheLayer,
}

impl SongRepository {
    pub fn new(pool: SqlitePool, cache: CacheLayer) -> Self {
        Self { pool, cache }
    }

    /// Insert a song
    ///
    /// # Errors
    /// `NotFound` when `album_id` names an unknown album.
    pub async fn add_song(&self, song: &CreateSong) -> Result<SongId> {
        let id = SongId::generate();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO songs (id, title, year, genre, performer, duration, album_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&song.title)
        .bind(song.year)
        .bind(&song.genre)
        .bind(&song.performer)
        .bind(song.duration)
        .bind(&song.album_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        tracing::debug!(song_id = %id, title = %song.title, "song added");
        Ok(id)
    }

    /// List songs, optionally narrowed by case-insensitive substrings
    pub async fn get_songs(&self, filter: &SongFilter) -> Result<Vec<SongSummary>> {
        let rows: Vec<(SongId, String, String)> = sqlx::query_as(
            r#"
            SELECT id, title, performer
            FROM songs
            WHERE (?1 IS NULL OR LOWER(title) LIKE LOWER(?1) ESCAPE '\')
              AND (?2 IS NULL OR LOWER(performer) LIKE LOWER(?2) ESCAPE '\')
            ORDER BY created_at, rowid
            "#,
        )
        .bind(filter.title.as_deref().map(crate::contains_pattern))
        .bind(filter.performer.as_deref().map(crate::contains_pattern))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, title, performer)| SongSummary {
                id,
                title,
                performer,
            })
            .collect())
    }

    pub async fn get_song(&self, id: &SongId) -> Result<Song> {
        let row: Option<SongRow> = sqlx::query_as(
            r#"
            SELECT id, title, year, genre, performer, duration, album_id
            FROM songs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Song::from)
            .ok_or_else(|| CadenceError::not_found("Song", id.as_str()))
    }

    /// Replace a song's fields
    ///
    /// Playlist snapshots and activity logs render the title, so every
    /// playlist that mentions the song is invalidated.
    pub async fn edit_song(&self, id: &SongId, song: &UpdateSong) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE songs
            SET title = ?, year = ?, genre = ?, performer = ?, duration = ?, album_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&song.title)
        .bind(song.year)
        .bind(&song.genre)
        .bind(&song.performer)
        .bind(song.duration)
        .bind(&song.album_id)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CadenceError::not_found("Song", id.as_str()));
        }

        let affected = playlists_referencing_song(&self.pool, id).await?;
        self.invalidate_playlists(affected).await;
        Ok(())
    }

    /// Delete a song; its playlist memberships cascade away
    pub async fn delete_song(&self, id: &SongId) -> Result<()> {
        // Collected first: the memberships are gone once the row is
        let affected = playlists_referencing_song(&self.pool, id).await?;

        let result = sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CadenceError::not_found("Song", id.as_str()));
        }

        self.invalidate_playlists(affected).await;

        tracing::info!(song_id = %id, "song deleted");
        Ok(())
    }

    pub async fn verify_song_exists(&self, id: &SongId) -> Result<()> {
        let row: Option<(SongId,)> = sqlx::query_as("SELECT id FROM songs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|_| ())
            .ok_or_else(|| CadenceError::not_found("Song", id.as_str()))
    }

    async fn invalidate_playlists(&self, playlists: Vec<PlaylistId>) {
        self.cache
            .invalidate_all(playlists.into_iter().flat_map(|playlist_id| {
                [
                    CacheKey::PlaylistSongs(playlist_id.clone()),
                    CacheKey::PlaylistActivity(playlist_id),
                ]
            }))
            .await;
    }
}
