//! Sessions: password hashing plus the access/refresh token pair
//!
//! Access and refresh tokens are signed with separate keys, so neither can
//! stand in for the other. A refresh token is honored only while its row is
//! still in `authentications`; logout deletes that row.

use crate::config::AuthSettings;
use crate::error::{Result, ServerError};
use cadence_core::{CadenceError, UserId};
use cadence_storage::Storage;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Rejection for an unknown username or a wrong password
pub const INVALID_CREDENTIALS: &str = "The credentials you provided are wrong";

/// Rejection for a refresh token that is forged, expired or logged out
pub const INVALID_REFRESH_TOKEN: &str = "Refresh token is invalid";

/// Tokens handed out on login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    id: UserId,
    iat: i64,
    exp: i64,
    /// Keeps two refresh tokens issued in the same second distinct
    jti: String,
}

struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl SigningKey {
    fn new(secret: &str, lifetime: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    fn sign(&self, user_id: &UserId) -> Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            id: user_id.clone(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
            jti: uuid::Uuid::new_v4().simple().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(ServerError::from)
    }

    fn verify(&self, token: &str) -> std::result::Result<UserId, jsonwebtoken::errors::Error> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<SessionClaims>(token, &self.decoding, &validation).map(|data| data.claims.id)
    }
}

pub struct AuthService {
    access: SigningKey,
    refresh: SigningKey,
    hash_cost: u32,
}

impl AuthService {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            access: SigningKey::new(
                &settings.access_token_key,
                Duration::minutes(settings.access_token_minutes as i64),
            ),
            refresh: SigningKey::new(
                &settings.refresh_token_key,
                Duration::days(settings.refresh_token_days as i64),
            ),
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt work factor
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub fn hash_password(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.hash_cost).map_err(ServerError::from)
    }

    /// Check credentials, issue a token pair and persist the refresh token
    pub async fn login(&self, storage: &Storage, username: &str, password: &str) -> Result<TokenPair> {
        let (user_id, password_hash) = storage
            .users()
            .find_credentials(username)
            .await?
            .ok_or_else(|| CadenceError::unauthenticated(INVALID_CREDENTIALS))?;

        if !bcrypt::verify(password, &password_hash)? {
            return Err(CadenceError::unauthenticated(INVALID_CREDENTIALS).into());
        }

        let tokens = TokenPair {
            access_token: self.access.sign(&user_id)?,
            refresh_token: self.refresh.sign(&user_id)?,
        };
        storage
            .authentications()
            .add_refresh_token(&tokens.refresh_token)
            .await?;

        tracing::info!(user_id = %user_id, "session started");
        Ok(tokens)
    }

    /// Trade a live refresh token for a new access token
    ///
    /// The token must be both persisted and correctly signed with the
    /// refresh key; either failure is an `Invariant`.
    pub async fn refresh(&self, storage: &Storage, refresh_token: &str) -> Result<String> {
        storage
            .authentications()
            .verify_refresh_token(refresh_token)
            .await?;

        let user_id = self.refresh.verify(refresh_token).map_err(|e| {
            tracing::debug!(error = %e, "refresh token signature rejected");
            CadenceError::invariant(INVALID_REFRESH_TOKEN)
        })?;

        self.access.sign(&user_id)
    }

    /// End the session behind a refresh token
    pub async fn logout(&self, storage: &Storage, refresh_token: &str) -> Result<()> {
        let tokens = storage.authentications();
        tokens.verify_refresh_token(refresh_token).await?;
        tokens.delete_refresh_token(refresh_token).await?;
        Ok(())
    }

    /// Resolve a bearer access token to its user
    pub fn authenticate(&self, access_token: &str) -> Result<UserId> {
        self.access.verify(access_token).map_err(|e| {
            tracing::warn!(error = %e, "access token rejected");
            CadenceError::unauthenticated("Invalid token").into()
        })
    }
}
