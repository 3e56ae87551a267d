/// Collaborations API routes (playlist owner only)
use crate::{
    api::{created, require, success_message},
    error::Result,
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use cadence_core::types::{PlaylistId, UserId};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationRequest {
    pub playlist_id: String,
    pub user_id: String,
}

impl CollaborationRequest {
    fn ids(self) -> Result<(PlaylistId, UserId)> {
        require("playlistId", &self.playlist_id)?;
        require("userId", &self.user_id)?;
        Ok((PlaylistId::new(self.playlist_id), UserId::new(self.user_id)))
    }
}

/// POST /collaborations
pub async fn add_collaboration(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<CollaborationRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let (playlist_id, user_id) = req.ids()?;

    app_state
        .storage
        .access()
        .verify_owner(&playlist_id, auth.user_id())
        .await?;
    let collaboration_id = app_state
        .storage
        .collaborations()
        .add_collaboration(&playlist_id, &user_id)
        .await?;

    Ok(created(
        "Collaboration added successfully",
        json!({ "collaborationId": collaboration_id }),
    ))
}

/// DELETE /collaborations
pub async fn delete_collaboration(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<CollaborationRequest>,
) -> Result<Json<Value>> {
    let (playlist_id, user_id) = req.ids()?;

    app_state
        .storage
        .access()
        .verify_owner(&playlist_id, auth.user_id())
        .await?;
    app_state
        .storage
        .collaborations()
        .delete_collaboration(&playlist_id, &user_id)
        .await?;

    Ok(success_message("Collaboration deleted successfully"))
}
