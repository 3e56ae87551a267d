//! Cadence Storage
//!
//! `SQLite` data-access layer for the Cadence catalog backend.
//!
//! This crate owns every relational row (users, albums, songs, playlists and
//! their membership, activity and collaboration rows) and routes the derived
//! playlist reads through an optional side cache.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: Each feature owns its own queries and logic
//! - **Read-Through Cache**: A miss recomputes from the store and fills the cache
//! - **Invalidation-Only**: Writes delete the keys they affect, never overwrite them
//! - **Explicit Wiring**: The pool and cache are passed in, never global
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_storage::{cache::MemoryCache, Storage};
//! use cadence_core::types::UserId;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Storage::open("sqlite://cadence.db", Arc::new(MemoryCache::new(1024))).await?;
//!
//! let owner = UserId::new("user-1");
//! let playlist_id = storage.playlists().add_playlist("Road trip", &owner).await?;
//! storage.access().verify_access(&playlist_id, &owner).await?;
//!
//! storage.close().await;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

pub mod access;
pub mod cache;

// Vertical slices
pub mod albums;
pub mod authentications;
pub mod collaborations;
pub mod playlists;
pub mod songs;
pub mod users;

pub use context::Storage;
pub use error::StorageError;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://cadence.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(database_url, "creating sqlite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        // Membership and activity rows cascade away with their playlist
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::info!("sqlite pool ready");

    Ok(pool)
}

/// Generate a prefixed id for rows that have no domain id type
pub(crate) fn new_row_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

/// `LIKE` pattern matching `needle` as a literal substring
///
/// Pair with `ESCAPE '\'` in the query.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
