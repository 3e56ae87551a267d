/// Core error types for Cadence
use thiserror::Error;

/// Result type alias using `CadenceError`
pub type Result<T> = std::result::Result<T, CadenceError>;

/// Message returned whenever a caller may not act on a playlist.
///
/// The owner check and the collaborator fallback share it so the caller sees
/// the same text whichever branch rejected.
pub const FORBIDDEN_MESSAGE: &str = "You are forbidden to access this resource";

/// Core error type for Cadence
#[derive(Error, Debug)]
pub enum CadenceError {
    /// Referenced row does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Caller is neither owner nor collaborator
    #[error("{0}")]
    Forbidden(String),

    /// A write violated a uniqueness or required-field constraint,
    /// or affected no rows
    #[error("{0}")]
    Invariant(String),

    /// Credentials or tokens were rejected
    #[error("{0}")]
    Unauthenticated(String),

    /// Side cache failure (never surfaced by repositories)
    #[error("Cache error: {0}")]
    Cache(String),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CadenceError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// The standard ownership-mismatch error
    pub fn forbidden() -> Self {
        Self::Forbidden(FORBIDDEN_MESSAGE.to_string())
    }

    /// Create an invariant (conflict) error
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Create an authentication error
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    /// Create a cache error
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    pub fn is_invariant(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }
}

/// Constraint violations are client-correctable; everything else from the
/// driver is a store failure and propagates as-is.
#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for CadenceError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::Invariant(format!("Duplicate entry: {}", db_err.message()));
            }
            if db_err.is_foreign_key_violation() {
                return Self::not_found("Referenced row", db_err.message());
            }
        }
        Self::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_uses_shared_message() {
        let err = CadenceError::forbidden();
        assert!(err.is_forbidden());
        assert_eq!(err.to_string(), FORBIDDEN_MESSAGE);
    }

    #[test]
    fn not_found_display() {
        let err = CadenceError::not_found("Playlist", "pl-1");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Playlist not found: pl-1");
    }
}
