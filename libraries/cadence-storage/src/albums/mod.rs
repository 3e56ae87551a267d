//! Albums, their covers and likes

use crate::cache::CacheLayer;
use crate::new_row_id;
use cadence_core::{
    error::Result,
    types::{Album, AlbumDetail, AlbumId, CreateAlbum, LikeCount, SongId, SongSummary, UpdateAlbum, UserId},
    CacheKey, CadenceError,
};
use chrono::Utc;
use sqlx::{FromRow, SqlitePool};

#[derive(FromRow)]
struct AlbumRow {
    id: AlbumId,
    name: String,
    year: i64,
    cover_url: Option<String>,
}

impl From<AlbumRow> for Album {
    fn from(row: AlbumRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            year: row.year as i32,
            cover_url: row.cover_url,
        }
    }
}

#[derive(Clone)]
pub struct AlbumRepository {
    pool: SqlitePool,
    cache: CacheLayer,
}

impl AlbumRepository {
    pub fn new(pool: SqlitePool, cache: CacheLayer) -> Self {
        Self { pool, cache }
    }

    pub async fn add_album(&self, album: &CreateAlbum) -> Result<AlbumId> {
        let id = AlbumId::generate();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO albums (id, name, year, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&album.name)
        .bind(album.year)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        tracing::debug!(album_id = %id, name = %album.name, "album added");
        Ok(id)
    }

    /// Album with the songs that reference it
    pub async fn get_album(&self, id: &AlbumId) -> Result<AlbumDetail> {
        let album = self.find_album(id).await?;

        let songs: Vec<(SongId, String, String)> = sqlx::query_as(
            "SELECT id, title, performer FROM songs WHERE album_id = ? ORDER BY created_at, rowid",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(AlbumDetail {
            id: album.id,
            name: album.name,
            year: album.year,
            cover_url: album.cover_url,
            songs: songs
                .into_iter()
                .map(|(id, title, performer)| SongSummary {
                    id,
                    title,
                    performer,
                })
                .collect(),
        })
    }

    /// Album row without its songs
    pub async fn find_album(&self, id: &AlbumId) -> Result<Album> {
        let row: Option<AlbumRow> =
            sqlx::query_as("SELECT id, name, year, cover_url FROM albums WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Album::from)
            .ok_or_else(|| CadenceError::not_found("Album", id.as_str()))
    }

    pub async fn edit_album(&self, id: &AlbumId, album: &UpdateAlbum) -> Result<()> {
        let result = sqlx::query("UPDATE albums SET name = ?, year = ?, updated_at = ? WHERE id = ?")
            .bind(&album.name)
            .bind(album.year)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CadenceError::not_found("Album", id.as_str()));
        }
        Ok(())
    }

    /// Delete an album; its songs keep existing without one
    pub async fn delete_album(&self, id: &AlbumId) -> Result<()> {
        let result = sqlx::query("DELETE FROM albums WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CadenceError::not_found("Album", id.as_str()));
        }

        self.cache
            .invalidate(&CacheKey::AlbumLikes(id.clone()))
            .await;

        tracing::info!(album_id = %id, "album deleted");
        Ok(())
    }

    /// Record the public URL of an uploaded cover
    pub async fn set_cover_url(&self, id: &AlbumId, cover_url: &str) -> Result<()> {
        let result = sqlx::query("UPDATE albums SET cover_url = ?, updated_at = ? WHERE id = ?")
            .bind(cover_url)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CadenceError::not_found("Album", id.as_str()));
        }
        Ok(())
    }

    /// Like an album once per user
    ///
    /// # Errors
    /// `NotFound` for an unknown album, `Invariant` when already liked.
    pub async fn like_album(&self, album_id: &AlbumId, user_id: &UserId) -> Result<()> {
        self.find_album(album_id).await?;

        sqlx::query("INSERT INTO user_album_likes (id, album_id, user_id) VALUES (?, ?, ?)")
            .bind(new_row_id("like"))
            .bind(album_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match CadenceError::from(e) {
                CadenceError::Invariant(_) => CadenceError::invariant("Album already liked"),
                other => other,
            })?;

        self.cache
            .invalidate(&CacheKey::AlbumLikes(album_id.clone()))
            .await;
        Ok(())
    }

    pub async fn unlike_album(&self, album_id: &AlbumId, user_id: &UserId) -> Result<()> {
        let result = sqlx::query("DELETE FROM user_album_likes WHERE album_id = ? AND user_id = ?")
            .bind(album_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CadenceError::not_found("Album like", album_id.as_str()));
        }

        self.cache
            .invalidate(&CacheKey::AlbumLikes(album_id.clone()))
            .await;
        Ok(())
    }

    /// Number of likes, read through `likes:<albumId>`
    pub async fn get_album_likes(&self, album_id: &AlbumId) -> Result<LikeCount> {
        let key = CacheKey::AlbumLikes(album_id.clone());
        if let Some(likes) = self.cache.read::<i64>(&key).await {
            return Ok(LikeCount {
                likes,
                from_cache: true,
            });
        }

        self.find_album(album_id).await?;

        let (likes,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM user_album_likes WHERE album_id = ?")
                .bind(album_id)
                .fetch_one(&self.pool)
                .await?;

        self.cache.fill(&key, &likes).await;
        Ok(LikeCount {
            likes,
            from_cache: false,
        })
    }
}
