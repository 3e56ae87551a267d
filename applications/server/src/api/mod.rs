/// API route modules
pub mod albums;
pub mod authentications;
pub mod collaborations;
pub mod exports;
pub mod health;
pub mod playlists;
pub mod songs;
pub mod users;

use crate::error::{Result, ServerError};
use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

/// `{"status":"success","data":...}`
pub(crate) fn success(data: Value) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": data,
    }))
}

/// `{"status":"success","message":...}`
pub(crate) fn success_message(message: &str) -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": message,
    }))
}

pub(crate) fn success_with_message(message: &str, data: Value) -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": message,
        "data": data,
    }))
}

/// 201 with a message and the created resource's id
pub(crate) fn created(message: &str, data: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, success_with_message(message, data))
}

/// Reject blank required string fields
pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ServerError::BadRequest(format!("\"{field}\" is not allowed to be empty")));
    }
    Ok(())
}
