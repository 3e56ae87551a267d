/// Users API routes
use crate::{
    api::{created, require, success},
    error::{Result, ServerError},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use cadence_core::types::{CreateUser, UserId};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub fullname: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub username: String,
}

/// POST /users
pub async fn register(
    State(app_state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    require("username", &req.username)?;
    require("password", &req.password)?;
    require("fullname", &req.fullname)?;

    let password_hash = app_state.auth_service.hash_password(&req.password)?;
    let user_id = app_state
        .storage
        .users()
        .add_user(&CreateUser {
            username: req.username,
            password_hash,
            fullname: req.fullname,
        })
        .await?;

    Ok(created("User created successfully", json!({ "userId": user_id })))
}

/// GET /users/:id
pub async fn get_user(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let user = app_state.storage.users().get_user(&UserId::new(id)).await?;
    Ok(success(json!({ "user": user })))
}

/// GET /users?username=
pub async fn search_users(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>> {
    if query.username.trim().is_empty() {
        return Err(ServerError::BadRequest("\"username\" query is required".to_string()));
    }

    let users = app_state.storage.users().search_users(&query.username).await?;
    Ok(success(json!({ "users": users })))
}
