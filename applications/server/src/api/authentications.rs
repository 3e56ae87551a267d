/// Authentication API routes
use crate::{
    api::{created, require, success_message, success_with_message},
    error::Result,
    state::AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /authentications
pub async fn login(
    State(app_state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    require("username", &req.username)?;
    require("password", &req.password)?;

    let tokens = app_state
        .auth_service
        .login(&app_state.storage, &req.username, &req.password)
        .await?;

    Ok(created(
        "Authentication added successfully",
        json!({
            "accessToken": tokens.access_token,
            "refreshToken": tokens.refresh_token,
        }),
    ))
}

/// PUT /authentications
pub async fn refresh(
    State(app_state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<Value>> {
    require("refreshToken", &req.refresh_token)?;

    let access_token = app_state
        .auth_service
        .refresh(&app_state.storage, &req.refresh_token)
        .await?;

    Ok(success_with_message(
        "Access token updated successfully",
        json!({ "accessToken": access_token }),
    ))
}

/// DELETE /authentications
pub async fn logout(
    State(app_state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<Value>> {
    require("refreshToken", &req.refresh_token)?;

    app_state
        .auth_service
        .logout(&app_state.storage, &req.refresh_token)
        .await?;

    Ok(success_message("Refresh token deleted successfully"))
}
