//! Playlists, their song membership and the membership activity log
//!
//! Reads go through the side cache; every mutation writes the store first and
//! then drops the keys it made stale, before returning to the caller.

use crate::cache::CacheLayer;
use crate::{collaborations, new_row_id};
use cadence_core::{
    error::Result,
    types::{
        ActivityAction, Playlist, PlaylistActivities, PlaylistActivity, PlaylistId,
        PlaylistSummary, PlaylistWithSongs, SongId, SongSummary, UserId,
    },
    CacheKey, CadenceError,
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Repository over `playlists`, `playlist_songs` and `playlist_song_activities`
#[derive(Clone)]
pub struct PlaylistRepository {
    pool: SqlitePool,
    cache: CacheLayer,
}

impl PlaylistRepository {
    pub fn new(pool: SqlitePool, cache: CacheLayer) -> Self {
        Self { pool, cache }
    }

    /// Create a playlist owned by `owner_id`
    pub async fn add_playlist(&self, name: &str, owner_id: &UserId) -> Result<PlaylistId> {
        let id = PlaylistId::generate();
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO playlists (id, name, owner, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CadenceError::invariant("Playlist failed to create"));
        }

        self.cache
            .invalidate(&CacheKey::PlaylistsByUser(owner_id.clone()))
            .await;

        tracing::info!(playlist_id = %id, owner = %owner_id, "playlist created");
        Ok(id)
    }

    /// Get the playlist row
    pub async fn get_playlist(&self, id: &PlaylistId) -> Result<Playlist> {
        let row: Option<(PlaylistId, String, UserId, DateTime<Utc>, DateTime<Utc>)> =
            sqlx::query_as(
                "SELECT id, name, owner, created_at, updated_at FROM playlists WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let (id, name, owner_id, created_at, updated_at) =
            row.ok_or_else(|| CadenceError::not_found("Playlist", id.as_str()))?;

        Ok(Playlist {
            id,
            name,
            owner_id,
            created_at,
            updated_at,
        })
    }

    /// Owner of the playlist, or `None` when no such playlist exists
    pub async fn get_owner(&self, id: &PlaylistId) -> Result<Option<UserId>> {
        let owner: Option<(UserId,)> = sqlx::query_as("SELECT owner FROM playlists WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner.map(|(owner,)| owner))
    }

    /// Playlists the user owns or collaborates on
    pub async fn get_playlists_by_user(&self, user_id: &UserId) -> Result<Vec<PlaylistSummary>> {
        let key = CacheKey::PlaylistsByUser(user_id.clone());
        if let Some(cached) = self.cache.read(&key).await {
            return Ok(cached);
        }

        let rows: Vec<(PlaylistId, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT p.id, p.name, u.username
            FROM playlists p
            LEFT JOIN users u ON u.id = p.owner
            WHERE p.owner = ?
               OR p.id IN (SELECT c.playlist_id FROM collaborations c WHERE c.user_id = ?)
            ORDER BY p.created_at, p.rowid
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let playlists: Vec<PlaylistSummary> = rows
            .into_iter()
            .map(|(id, name, username)| PlaylistSummary { id, name, username })
            .collect();

        self.cache.fill(&key, &playlists).await;
        Ok(playlists)
    }

    /// Delete a playlist; membership, activity and collaboration rows cascade
    pub async fn delete_playlist(&self, id: &PlaylistId) -> Result<()> {
        let owner = self
            .get_owner(id)
            .await?
            .ok_or_else(|| CadenceError::not_found("Playlist", id.as_str()))?;
        let collaborators = collaborations::collaborator_ids(&self.pool, id).await?;

        let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CadenceError::not_found("Playlist", id.as_str()));
        }

        let mut stale = vec![
            CacheKey::PlaylistsByUser(owner),
            CacheKey::PlaylistSongs(id.clone()),
            CacheKey::PlaylistActivity(id.clone()),
        ];
        stale.extend(collaborators.into_iter().map(CacheKey::PlaylistsByUser));
        self.cache.invalidate_all(stale).await;

        tracing::info!(playlist_id = %id, "playlist deleted");
        Ok(())
    }

    /// Move `(playlist, song)` from absent to present and log the transition
    ///
    /// # Errors
    /// `Invariant` when the song is already a member; the store's unique
    /// index is what rejects it.
    pub async fn add_song_to_playlist(
        &self,
        playlist_id: &PlaylistId,
        song_id: &SongId,
        user_id: &UserId,
    ) -> Result<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO playlist_songs (id, playlist_id, song_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(new_row_id("ps"))
        .bind(playlist_id)
        .bind(song_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match CadenceError::from(e) {
            CadenceError::Invariant(_) => {
                CadenceError::invariant("Song is already in the playlist")
            }
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(CadenceError::invariant("Song failed to be added to playlist"));
        }

        self.cache
            .invalidate(&CacheKey::PlaylistSongs(playlist_id.clone()))
            .await;

        self.append_activity(playlist_id, song_id, user_id, ActivityAction::Add)
            .await
    }

    /// Move `(playlist, song)` from present to absent and log the transition
    ///
    /// # Errors
    /// `NotFound` when the song is not a member.
    pub async fn remove_song_from_playlist(
        &self,
        playlist_id: &PlaylistId,
        song_id: &SongId,
        user_id: &UserId,
    ) -> Result<()> {
        let result = sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
            .bind(playlist_id)
            .bind(song_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CadenceError::not_found("Playlist song", song_id.as_str()));
        }

        self.cache
            .invalidate(&CacheKey::PlaylistSongs(playlist_id.clone()))
            .await;

        self.append_activity(playlist_id, song_id, user_id, ActivityAction::Delete)
            .await
    }

    /// Playlist header with its member songs, in insertion order
    pub async fn get_playlist_with_songs(&self, id: &PlaylistId) -> Result<PlaylistWithSongs> {
        let key = CacheKey::PlaylistSongs(id.clone());
        if let Some(cached) = self.cache.read(&key).await {
            return Ok(cached);
        }

        let header: Option<(PlaylistId, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT p.id, p.name, u.username
            FROM playlists p
            LEFT JOIN users u ON u.id = p.owner
            WHERE p.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let (playlist_id, name, username) =
            header.ok_or_else(|| CadenceError::not_found("Playlist", id.as_str()))?;

        let songs: Vec<(SongId, String, String)> = sqlx::query_as(
            r#"
            SELECT s.id, s.title, s.performer
            FROM playlist_songs ps
            INNER JOIN songs s ON s.id = ps.song_id
            WHERE ps.playlist_id = ?
            ORDER BY ps.created_at, ps.rowid
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let snapshot = PlaylistWithSongs {
            id: playlist_id,
            name,
            username,
            songs: songs
                .into_iter()
                .map(|(id, title, performer)| SongSummary {
                    id,
                    title,
                    performer,
                })
                .collect(),
        };

        self.cache.fill(&key, &snapshot).await;
        Ok(snapshot)
    }

    /// Append one row to the audit log
    pub async fn append_activity(
        &self,
        playlist_id: &PlaylistId,
        song_id: &SongId,
        user_id: &UserId,
        action: ActivityAction,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO playlist_song_activities (id, playlist_id, song_id, user_id, action, time)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new_row_id("activity"))
        .bind(playlist_id)
        .bind(song_id)
        .bind(user_id)
        .bind(action.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CadenceError::invariant("Playlist activity failed to record"));
        }

        self.cache
            .invalidate(&CacheKey::PlaylistActivity(playlist_id.clone()))
            .await;

        tracing::debug!(
            playlist_id = %playlist_id,
            song_id = %song_id,
            user_id = %user_id,
            %action,
            "playlist activity recorded"
        );
        Ok(())
    }

    /// Chronological activity log of a playlist
    pub async fn get_playlist_activity(&self, id: &PlaylistId) -> Result<PlaylistActivities> {
        let key = CacheKey::PlaylistActivity(id.clone());
        if let Some(cached) = self.cache.read(&key).await {
            return Ok(cached);
        }

        if self.get_owner(id).await?.is_none() {
            return Err(CadenceError::not_found("Playlist", id.as_str()));
        }

        let rows: Vec<(Option<String>, Option<String>, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT u.username, s.title, psa.action, psa.time
            FROM playlist_song_activities psa
            LEFT JOIN users u ON u.id = psa.user_id
            LEFT JOIN songs s ON s.id = psa.song_id
            WHERE psa.playlist_id = ?
            ORDER BY psa.time, psa.rowid
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let activities = rows
            .into_iter()
            .map(|(username, title, action, time)| {
                let action = action.parse::<ActivityAction>().map_err(CadenceError::Database)?;
                Ok(PlaylistActivity {
                    username,
                    title,
                    action,
                    time,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let log = PlaylistActivities {
            playlist_id: id.clone(),
            activities,
        };

        self.cache.fill(&key, &log).await;
        Ok(log)
    }
}

/// Playlists whose cached projections mention the song, as a member or in
/// their activity log
pub(crate) async fn playlists_referencing_song(
    pool: &SqlitePool,
    song_id: &SongId,
) -> Result<Vec<PlaylistId>> {
    let rows: Vec<(PlaylistId,)> = sqlx::query_as(
        r#"
        SELECT playlist_id FROM playlist_songs WHERE song_id = ?
        UNION
        SELECT playlist_id FROM playlist_song_activities WHERE song_id = ?
        "#,
    )
    .bind(song_id)
    .bind(song_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}
