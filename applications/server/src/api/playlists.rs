//! Playlists API routes
//!
//! Deleting a playlist is owner-only; reading and changing its songs is open
//! to the owner and collaborators.

use crate::{
    api::{created, require, success, success_message},
    error::Result,
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cadence_core::types::{PlaylistId, SongId};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSongRequest {
    pub song_id: String,
}

/// POST /playlists
pub async fn create_playlist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<CreatePlaylistRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    require("name", &req.name)?;

    let playlist_id = app_state
        .storage
        .playlists()
        .add_playlist(&req.name, auth.user_id())
        .await?;

    Ok(created(
        "Playlist created successfully",
        json!({ "playlistId": playlist_id }),
    ))
}

/// GET /playlists
/// Playlists the caller owns or collaborates on
pub async fn list_playlists(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Value>> {
    let playlists = app_state
        .storage
        .playlists()
        .get_playlists_by_user(auth.user_id())
        .await?;

    Ok(success(json!({ "playlists": playlists })))
}

/// DELETE /playlists/:id
pub async fn delete_playlist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let playlist_id = PlaylistId::new(id);

    app_state
        .storage
        .access()
        .verify_owner(&playlist_id, auth.user_id())
        .await?;
    app_state.storage.playlists().delete_playlist(&playlist_id).await?;

    Ok(success_message("Playlist deleted successfully"))
}

/// POST /playlists/:id/songs
pub async fn add_song(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    Json(req): Json<PlaylistSongRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    require("songId", &req.song_id)?;
    let playlist_id = PlaylistId::new(id);
    let song_id = SongId::new(req.song_id);

    app_state
        .storage
        .access()
        .verify_access(&playlist_id, auth.user_id())
        .await?;
    app_state.storage.songs().verify_song_exists(&song_id).await?;
    app_state
        .storage
        .playlists()
        .add_song_to_playlist(&playlist_id, &song_id, auth.user_id())
        .await?;

    Ok((
        StatusCode::CREATED,
        success_message("Song added to playlist successfully"),
    ))
}

/// GET /playlists/:id/songs
pub async fn get_songs(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let playlist_id = PlaylistId::new(id);

    app_state
        .storage
        .access()
        .verify_access(&playlist_id, auth.user_id())
        .await?;
    let playlist = app_state
        .storage
        .playlists()
        .get_playlist_with_songs(&playlist_id)
        .await?;

    Ok(success(json!({ "playlist": playlist })))
}

/// DELETE /playlists/:id/songs
pub async fn remove_song(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    Json(req): Json<PlaylistSongRequest>,
) -> Result<Json<Value>> {
    require("songId", &req.song_id)?;
    let playlist_id = PlaylistId::new(id);

    app_state
        .storage
        .access()
        .verify_access(&playlist_id, auth.user_id())
        .await?;
    app_state
        .storage
        .playlists()
        .remove_song_from_playlist(&playlist_id, &SongId::new(req.song_id), auth.user_id())
        .await?;

    Ok(success_message("Song removed from playlist successfully"))
}

/// GET /playlists/:id/activities
pub async fn get_activities(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let playlist_id = PlaylistId::new(id);

    app_state
        .storage
        .access()
        .verify_access(&playlist_id, auth.user_id())
        .await?;
    let log = app_state
        .storage
        .playlists()
        .get_playlist_activity(&playlist_id)
        .await?;

    Ok(success(serde_json::to_value(log).map_err(cadence_core::CadenceError::from)?))
}
