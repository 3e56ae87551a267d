/// User domain type
use super::ids::UserId;
use serde::{Deserialize, Serialize};

/// User account (never carries the password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub fullname: String,
}

/// Data for registering a user; `password_hash` is produced by the caller
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password_hash: String,
    pub fullname: String,
}
