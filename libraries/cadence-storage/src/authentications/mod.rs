//! Persisted refresh tokens
//!
//! A refresh token is only honoured while its row exists. Verification reads
//! through `refreshToken:<token>`; logout deletes the row and then the key.

use crate::cache::CacheLayer;
use cadence_core::{error::Result, CacheKey, CadenceError};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AuthenticationRepository {
    pool: SqlitePool,
    cache: CacheLayer,
}

impl AuthenticationRepository {
    pub fn new(pool: SqlitePool, cache: CacheLayer) -> Self {
        Self { pool, cache }
    }

    pub async fn add_refresh_token(&self, token: &str) -> Result<()> {
        sqlx::query("INSERT INTO authentications (token) VALUES (?)")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// # Errors
    /// `Invariant` when the token was never issued or has been revoked.
    pub async fn verify_refresh_token(&self, token: &str) -> Result<()> {
        let key = CacheKey::RefreshToken(token.to_string());
        if self.cache.read::<bool>(&key).await == Some(true) {
            return Ok(());
        }

        let row: Option<(String,)> =
            sqlx::query_as("SELECT token FROM authentications WHERE token = ?")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        if row.is_none() {
            return Err(CadenceError::invariant("Refresh token is invalid"));
        }

        self.cache.fill(&key, &true).await;
        Ok(())
    }

    pub async fn delete_refresh_token(&self, token: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM authentications WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CadenceError::invariant("Refresh token is invalid"));
        }

        self.cache
            .invalidate(&CacheKey::RefreshToken(token.to_string()))
            .await;
        Ok(())
    }
}
