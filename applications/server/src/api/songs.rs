/// Songs API routes
use crate::{
    api::{created, require, success, success_message},
    error::{Result, ServerError},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use cadence_core::types::{CreateSong, SongFilter, SongId};
use serde_json::{json, Value};

fn validate(song: &CreateSong) -> Result<()> {
    require("title", &song.title)?;
    require("genre", &song.genre)?;
    require("performer", &song.performer)?;
    if song.duration.is_some_and(|d| d < 0) {
        return Err(ServerError::BadRequest(
            "\"duration\" must be a positive number".to_string(),
        ));
    }
    Ok(())
}

/// POST /songs
pub async fn create_song(
    State(app_state): State<AppState>,
    Json(req): Json<CreateSong>,
) -> Result<(StatusCode, Json<Value>)> {
    validate(&req)?;
    let song_id = app_state.storage.songs().add_song(&req).await?;
    Ok(created("Song added successfully", json!({ "songId": song_id })))
}

/// GET /songs?title=&performer=
pub async fn list_songs(
    State(app_state): State<AppState>,
    Query(filter): Query<SongFilter>,
) -> Result<Json<Value>> {
    let songs = app_state.storage.songs().get_songs(&filter).await?;
    Ok(success(json!({ "songs": songs })))
}

/// GET /songs/:id
pub async fn get_song(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let song = app_state.storage.songs().get_song(&SongId::new(id)).await?;
    Ok(success(json!({ "song": song })))
}

/// PUT /songs/:id
pub async fn update_song(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CreateSong>,
) -> Result<Json<Value>> {
    validate(&req)?;
    app_state
        .storage
        .songs()
        .edit_song(&SongId::new(id), &req)
        .await?;
    Ok(success_message("Song has been updated"))
}

/// DELETE /songs/:id
pub async fn delete_song(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    app_state.storage.songs().delete_song(&SongId::new(id)).await?;
    Ok(success_message("Song has been deleted"))
}
