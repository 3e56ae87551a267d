/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cadence_core::CadenceError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Domain(#[from] CadenceError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

impl From<cadence_storage::StorageError> for ServerError {
    fn from(err: cadence_storage::StorageError) -> Self {
        ServerError::Domain(err.into())
    }
}

impl ServerError {
    /// Status code and client-facing message; `None` for server faults
    fn client_error(&self) -> Option<(StatusCode, String)> {
        match self {
            ServerError::Domain(err) => match err {
                CadenceError::NotFound { .. } => Some((StatusCode::NOT_FOUND, err.to_string())),
                CadenceError::Forbidden(msg) => Some((StatusCode::FORBIDDEN, msg.clone())),
                CadenceError::Invariant(msg) => Some((StatusCode::BAD_REQUEST, msg.clone())),
                CadenceError::Unauthenticated(msg) => {
                    Some((StatusCode::UNAUTHORIZED, msg.clone()))
                }
                CadenceError::Cache(_)
                | CadenceError::Database(_)
                | CadenceError::Serialization(_)
                | CadenceError::Io(_) => None,
            },
            ServerError::BadRequest(msg) => Some((StatusCode::BAD_REQUEST, msg.clone())),
            ServerError::PayloadTooLarge(msg) => {
                Some((StatusCode::PAYLOAD_TOO_LARGE, msg.clone()))
            }
            ServerError::Export(_)
            | ServerError::Config(_)
            | ServerError::Io(_)
            | ServerError::Jwt(_)
            | ServerError::Bcrypt(_) => None,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if let Some((status, message)) = self.client_error() {
            let body = Json(json!({
                "status": "fail",
                "message": message,
            }));
            return (status, body).into_response();
        }

        tracing::error!(error = ?self, "request failed");

        let body = Json(json!({
            "status": "error",
            "message": "Server Error",
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
