//! User accounts

use cadence_core::{
    error::Result,
    types::{CreateUser, User, UserId},
    CadenceError,
};
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a user
    ///
    /// # Errors
    /// `Invariant` when the username is taken.
    pub async fn add_user(&self, user: &CreateUser) -> Result<UserId> {
        let taken: Option<(UserId,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
            .bind(&user.username)
            .fetch_optional(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(CadenceError::invariant(
                "Failed to add user. Username is already taken",
            ));
        }

        let id = UserId::generate();
        let now = Utc::now();

        // The unique index still guards a racing registration
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password, fullname, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.fullname)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        tracing::info!(user_id = %id, username = %user.username, "user registered");
        Ok(id)
    }

    pub async fn get_user(&self, id: &UserId) -> Result<User> {
        let row: Option<(UserId, String, String)> =
            sqlx::query_as("SELECT id, username, fullname FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let (id, username, fullname) =
            row.ok_or_else(|| CadenceError::not_found("User", id.as_str()))?;
        Ok(User {
            id,
            username,
            fullname,
        })
    }

    /// Id and password hash for a username, `None` when unknown
    pub async fn find_credentials(&self, username: &str) -> Result<Option<(UserId, String)>> {
        let row: Option<(UserId, String)> =
            sqlx::query_as("SELECT id, password FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    pub async fn verify_user_exists(&self, id: &UserId) -> Result<()> {
        let row: Option<(UserId,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|_| ())
            .ok_or_else(|| CadenceError::not_found("User", id.as_str()))
    }

    /// Users whose username contains `query`, case-insensitively
    pub async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        let rows: Vec<(UserId, String, String)> = sqlx::query_as(
            r#"
            SELECT id, username, fullname
            FROM users
            WHERE LOWER(username) LIKE LOWER(?) ESCAPE '\'
            ORDER BY username
            "#,
        )
        .bind(crate::contains_pattern(query))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, username, fullname)| User {
                id,
                username,
                fullname,
            })
            .collect())
    }
}
