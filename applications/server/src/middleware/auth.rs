/// Bearer-token authentication
use crate::{error::ServerError, services::AuthService};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use cadence_core::{CadenceError, UserId};
use std::sync::Arc;

/// The caller behind a verified access token
///
/// Handlers that take this extractor reject requests without a valid
/// `Authorization: Bearer <token>` header with 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    pub fn user_id(&self) -> &UserId {
        &self.0
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(|| CadenceError::unauthenticated("Missing authentication"))?;

        let auth_service = Arc::<AuthService>::from_ref(state);
        auth_service.authenticate(token).map(Self)
    }
}
