use crate::access::PlaylistAccess;
use crate::albums::AlbumRepository;
use crate::authentications::AuthenticationRepository;
use crate::cache::CacheLayer;
use crate::collaborations::CollaborationRepository;
use crate::playlists::PlaylistRepository;
use crate::songs::SongRepository;
use crate::users::UserRepository;
use crate::{create_pool, run_migrations, StorageError};
use cadence_core::CacheStore;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Every repository wired from one pool and one cache client
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
    playlists: PlaylistRepository,
    collaborations: CollaborationRepository,
    songs: SongRepository,
    albums: AlbumRepository,
    users: UserRepository,
    authentications: AuthenticationRepository,
    access: PlaylistAccess,
}

impl Storage {
    pub fn new(pool: SqlitePool, cache: Arc<dyn CacheStore>) -> Self {
        let cache = CacheLayer::new(cache);

        let playlists = PlaylistRepository::new(pool.clone(), cache.clone());
        let collaborations = CollaborationRepository::new(pool.clone(), cache.clone());
        let access = PlaylistAccess::new(playlists.clone(), Arc::new(collaborations.clone()));

        Self {
            songs: SongRepository::new(pool.clone(), cache.clone()),
            albums: AlbumRepository::new(pool.clone(), cache.clone()),
            users: UserRepository::new(pool.clone()),
            authentications: AuthenticationRepository::new(pool.clone(), cache),
            playlists,
            collaborations,
            access,
            pool,
        }
    }

    /// Connect, migrate and wire
    pub async fn open(database_url: &str, cache: Arc<dyn CacheStore>) -> Result<Self, StorageError> {
        let pool = create_pool(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self::new(pool, cache))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn playlists(&self) -> &PlaylistRepository {
        &self.playlists
    }

    pub fn collaborations(&self) -> &CollaborationRepository {
        &self.collaborations
    }

    pub fn songs(&self) -> &SongRepository {
        &self.songs
    }

    pub fn albums(&self) -> &AlbumRepository {
        &self.albums
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    pub fn authentications(&self) -> &AuthenticationRepository {
        &self.authentications
    }

    pub fn access(&self) -> &PlaylistAccess {
        &self.access
    }

    /// Close the pool, waiting for checked-out connections
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("sqlite pool closed");
    }
}
