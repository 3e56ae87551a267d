/// Export API routes
use crate::{
    api::{require, success_message},
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    services::{ExportRequest, PLAYLIST_EXPORT_QUEUE},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cadence_core::types::PlaylistId;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPlaylistRequest {
    pub target_email: String,
}

/// POST /export/playlists/:id
pub async fn export_playlist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    Json(req): Json<ExportPlaylistRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    require("targetEmail", &req.target_email)?;
    if !is_email(&req.target_email) {
        return Err(ServerError::BadRequest(
            "\"targetEmail\" must be a valid email".to_string(),
        ));
    }

    let playlist_id = PlaylistId::new(id);
    app_state
        .storage
        .access()
        .verify_owner(&playlist_id, auth.user_id())
        .await?;

    let message = serde_json::to_string(&ExportRequest {
        playlist_id: playlist_id.clone(),
        target_email: req.target_email,
    })
    .map_err(cadence_core::CadenceError::from)?;

    app_state
        .exports
        .send_message(PLAYLIST_EXPORT_QUEUE, message)
        .await?;

    tracing::info!(playlist_id = %playlist_id, "playlist export queued");

    Ok((
        StatusCode::CREATED,
        success_message("Your request is being processed"),
    ))
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}
