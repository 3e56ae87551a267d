//! Playlist collaborations
//!
//! A collaboration grants a non-owner read and membership-write access to a
//! playlist. Collaborated playlists show up in the collaborator's listing, so
//! every change here drops that user's `playlist:` key.

use crate::cache::CacheLayer;
use crate::new_row_id;
use async_trait::async_trait;
use cadence_core::{
    error::Result,
    types::{PlaylistId, UserId},
    CacheKey, CadenceError, CollaborationResolver,
};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct CollaborationRepository {
    pool: SqlitePool,
    cache: CacheLayer,
}

impl CollaborationRepository {
    pub fn new(pool: SqlitePool, cache: CacheLayer) -> Self {
        Self { pool, cache }
    }

    /// Record that `user_id` collaborates on `playlist_id`
    ///
    /// Returns the new collaboration id.
    ///
    /// # Errors
    /// `NotFound` for an unknown user, `Invariant` when the pair already exists.
    pub async fn add_collaboration(
        &self,
        playlist_id: &PlaylistId,
        user_id: &UserId,
    ) -> Result<String> {
        let user: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        if user.is_none() {
            return Err(CadenceError::not_found("User", user_id.as_str()));
        }

        let id = new_row_id("collab");
        sqlx::query("INSERT INTO collaborations (id, playlist_id, user_id) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(playlist_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match CadenceError::from(e) {
                CadenceError::Invariant(_) => {
                    CadenceError::invariant("User already collaborates on this playlist")
                }
                other => other,
            })?;

        self.cache
            .invalidate(&CacheKey::PlaylistsByUser(user_id.clone()))
            .await;

        tracing::info!(playlist_id = %playlist_id, user_id = %user_id, "collaboration added");
        Ok(id)
    }

    /// Remove a collaboration
    ///
    /// # Errors
    /// `Invariant` when there was nothing to remove.
    pub async fn delete_collaboration(
        &self,
        playlist_id: &PlaylistId,
        user_id: &UserId,
    ) -> Result<()> {
        let result = sqlx::query("DELETE FROM collaborations WHERE playlist_id = ? AND user_id = ?")
            .bind(playlist_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CadenceError::invariant("Collaboration failed to delete"));
        }

        self.cache
            .invalidate(&CacheKey::PlaylistsByUser(user_id.clone()))
            .await;

        tracing::info!(playlist_id = %playlist_id, user_id = %user_id, "collaboration removed");
        Ok(())
    }

    /// Users collaborating on a playlist
    pub async fn get_collaborators(&self, playlist_id: &PlaylistId) -> Result<Vec<UserId>> {
        collaborator_ids(&self.pool, playlist_id).await
    }
}

#[async_trait]
impl CollaborationResolver for CollaborationRepository {
    async fn verify_collaborator(&self, playlist_id: &PlaylistId, user_id: &UserId) -> Result<()> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT id FROM collaborations WHERE playlist_id = ? AND user_id = ?")
                .bind(playlist_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(_) => Ok(()),
            None => Err(CadenceError::invariant("Collaboration not verified")),
        }
    }
}

pub(crate) async fn collaborator_ids(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
) -> Result<Vec<UserId>> {
    let rows: Vec<(UserId,)> =
        sqlx::query_as("SELECT user_id FROM collaborations WHERE playlist_id = ? ORDER BY rowid")
            .bind(playlist_id)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}
