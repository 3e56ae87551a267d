/// Core traits for Cadence
use crate::error::Result;
use crate::types::{PlaylistId, UserId};
use async_trait::async_trait;

/// Answers "is this user a collaborator of this playlist"
///
/// Consulted only by the playlist authorization check, after the owner check
/// has already rejected the caller.
#[async_trait]
pub trait CollaborationResolver: Send + Sync {
    /// Succeeds when `user_id` collaborates on `playlist_id`
    ///
    /// # Errors
    /// Fails when no collaboration exists or the lookup itself failed
    async fn verify_collaborator(&self, playlist_id: &PlaylistId, user_id: &UserId) -> Result<()>;
}
