//! Playlist authorization
//!
//! Access is decided in two steps: an owner check against the relational
//! store, then (only when the playlist exists but belongs to someone else) a
//! collaborator check. The precedence rule lives in [`decide`], a pure
//! function, so it can be tested without a database:
//!
//! - an unknown playlist is `NotFound`, whoever asks
//! - the owner is always let in
//! - anyone else needs a collaboration; if that check fails for any reason,
//!   the caller sees the ownership error, never the secondary one

use crate::playlists::PlaylistRepository;
use cadence_core::{
    error::Result,
    types::{PlaylistId, UserId},
    CadenceError, CollaborationResolver,
};
use std::sync::Arc;

/// Outcome of the owner check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// No playlist with that id
    Missing,
    Owner,
    NotOwner,
}

impl Ownership {
    /// Compare a playlist's recorded owner against the caller
    pub fn of(owner: Option<&UserId>, user_id: &UserId) -> Self {
        match owner {
            None => Self::Missing,
            Some(owner) if owner == user_id => Self::Owner,
            Some(_) => Self::NotOwner,
        }
    }

    /// The owner-only verdict
    pub fn into_result(self, playlist_id: &PlaylistId) -> Result<()> {
        match self {
            Self::Owner => Ok(()),
            Self::Missing => Err(CadenceError::not_found("Playlist", playlist_id.as_str())),
            Self::NotOwner => Err(CadenceError::forbidden()),
        }
    }
}

/// Why access was granted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessGrant {
    Owner,
    Collaborator,
}

/// Combine the owner check with the (lazily run) collaborator check
///
/// `collaborator` is only consulted for [`Ownership::NotOwner`]; its error is
/// discarded in favour of the ownership error.
pub fn decide(
    playlist_id: &PlaylistId,
    ownership: Ownership,
    collaborator: Option<Result<()>>,
) -> Result<AccessGrant> {
    match (ownership, collaborator) {
        (Ownership::Missing, _) => Err(CadenceError::not_found("Playlist", playlist_id.as_str())),
        (Ownership::Owner, _) => Ok(AccessGrant::Owner),
        (Ownership::NotOwner, Some(Ok(()))) => Ok(AccessGrant::Collaborator),
        (Ownership::NotOwner, Some(Err(_)) | None) => Err(CadenceError::forbidden()),
    }
}

/// Authorization resolver for playlists
#[derive(Clone)]
pub struct PlaylistAccess {
    playlists: PlaylistRepository,
    collaborations: Arc<dyn CollaborationResolver>,
}

impl PlaylistAccess {
    pub fn new(playlists: PlaylistRepository, collaborations: Arc<dyn CollaborationResolver>) -> Self {
        Self {
            playlists,
            collaborations,
        }
    }

    async fn ownership(&self, playlist_id: &PlaylistId, user_id: &UserId) -> Result<Ownership> {
        let owner = self.playlists.get_owner(playlist_id).await?;
        Ok(Ownership::of(owner.as_ref(), user_id))
    }

    /// Succeeds only for the playlist's owner
    pub async fn verify_owner(&self, playlist_id: &PlaylistId, user_id: &UserId) -> Result<()> {
        self.ownership(playlist_id, user_id)
            .await?
            .into_result(playlist_id)
    }

    /// Succeeds for the owner or a collaborator
    ///
    /// # Errors
    /// `NotFound` for an unknown playlist, otherwise `Forbidden` with the
    /// ownership message. A store failure during the owner check propagates
    /// as-is.
    pub async fn verify_access(
        &self,
        playlist_id: &PlaylistId,
        user_id: &UserId,
    ) -> Result<AccessGrant> {
        let ownership = self.ownership(playlist_id, user_id).await?;

        let collaborator = match ownership {
            Ownership::NotOwner => Some(
                self.collaborations
                    .verify_collaborator(playlist_id, user_id)
                    .await,
            ),
            Ownership::Missing | Ownership::Owner => None,
        };

        if let Some(Err(e)) = &collaborator {
            tracing::debug!(
                playlist_id = %playlist_id,
                user_id = %user_id,
                error = %e,
                "collaborator check rejected"
            );
        }

        decide(playlist_id, ownership, collaborator)
    }
}
