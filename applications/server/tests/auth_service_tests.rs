/// Authentication service tests
/// Tests password hashing and the login, refresh and logout session flow
mod common;

use cadence_core::{CadenceError, CreateUser, UserId};
use cadence_server::{services::AuthService, ServerError};
use cadence_storage::{cache::MemoryCache, Storage};
use std::sync::Arc;
use tempfile::TempDir;

/// Test password hashing produces valid, salted bcrypt hashes
#[tokio::test]
async fn test_password_hashing() {
    let auth_service = create_test_auth_service();

    let password = "MySecurePassword123!";
    let hash = auth_service.hash_password(password).unwrap();

    // bcrypt starts with $2b$ or $2a$
    assert!(hash.starts_with("$2b$") || hash.starts_with("$2a$"));

    let hash2 = auth_service.hash_password(password).unwrap();
    assert_ne!(hash, hash2, "Hashes should differ due to random salt");
}

/// Test a successful login yields an access token for the user and a persisted refresh token
#[tokio::test]
async fn test_login_issues_token_pair() {
    let (storage, _temp_dir) = open_storage().await;
    let auth_service = create_test_auth_service();
    let user_id = add_user(&storage, &auth_service, "testuser").await;

    let tokens = auth_service
        .login(&storage, "testuser", "TestPassword123!")
        .await
        .unwrap();

    assert_eq!(auth_service.authenticate(&tokens.access_token).unwrap(), user_id);
    storage
        .authentications()
        .verify_refresh_token(&tokens.refresh_token)
        .await
        .unwrap();
}

/// Test wrong passwords and unknown usernames are the same 401
#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let (storage, _temp_dir) = open_storage().await;
    let auth_service = create_test_auth_service();
    add_user(&storage, &auth_service, "testuser").await;

    let wrong_password = auth_service
        .login(&storage, "testuser", "WrongPassword")
        .await
        .unwrap_err();
    let unknown_user = auth_service
        .login(&storage, "nobody", "TestPassword123!")
        .await
        .unwrap_err();

    for err in [wrong_password, unknown_user] {
        assert!(
            matches!(err, ServerError::Domain(CadenceError::Unauthenticated(ref msg)) if msg == "The credentials you provided are wrong"),
            "unexpected error: {err:?}"
        );
    }
}

/// Test two logins in the same second still get distinct refresh tokens
#[tokio::test]
async fn test_refresh_tokens_are_unique() {
    let (storage, _temp_dir) = open_storage().await;
    let auth_service = create_test_auth_service();
    add_user(&storage, &auth_service, "testuser").await;

    let first = auth_service.login(&storage, "testuser", "TestPassword123!").await.unwrap();
    let second = auth_service.login(&storage, "testuser", "TestPassword123!").await.unwrap();

    assert_ne!(first.refresh_token, second.refresh_token);
}

/// Test refresh returns a working access token until logout revokes the session
#[tokio::test]
async fn test_refresh_then_logout() {
    let (storage, _temp_dir) = open_storage().await;
    let auth_service = create_test_auth_service();
    let user_id = add_user(&storage, &auth_service, "testuser").await;

    let tokens = auth_service
        .login(&storage, "testuser", "TestPassword123!")
        .await
        .unwrap();

    let access = auth_service.refresh(&storage, &tokens.refresh_token).await.unwrap();
    assert_eq!(auth_service.authenticate(&access).unwrap(), user_id);

    auth_service.logout(&storage, &tokens.refresh_token).await.unwrap();

    let err = auth_service
        .refresh(&storage, &tokens.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, ServerError::Domain(CadenceError::Invariant(_))));

    let err = auth_service
        .logout(&storage, &tokens.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, ServerError::Domain(CadenceError::Invariant(_))));
}

/// Test a persisted token signed with the wrong key is still refused
#[tokio::test]
async fn test_refresh_rejects_foreign_signature() {
    let (storage, _temp_dir) = open_storage().await;
    let auth_service = create_test_auth_service();
    add_user(&storage, &auth_service, "testuser").await;

    let tokens = auth_service
        .login(&storage, "testuser", "TestPassword123!")
        .await
        .unwrap();

    // An access token is a valid JWT, just not one signed with the refresh key
    storage
        .authentications()
        .add_refresh_token(&tokens.access_token)
        .await
        .unwrap();

    let err = auth_service
        .refresh(&storage, &tokens.access_token)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ServerError::Domain(CadenceError::Invariant(ref msg)) if msg == "Refresh token is invalid")
    );
}

/// Test access tokens from another deployment, garbage and empty input are 401
#[tokio::test]
async fn test_authenticate_rejects_bad_tokens() {
    let (storage, _temp_dir) = open_storage().await;
    let auth_service = create_test_auth_service();
    add_user(&storage, &auth_service, "testuser").await;

    let mut settings = common::auth_settings();
    settings.access_token_key = "different-access-key".to_string();
    let other_auth = AuthService::new(&settings).with_hash_cost(4);
    let foreign = other_auth
        .login(&storage, "testuser", "TestPassword123!")
        .await
        .unwrap()
        .access_token;

    for token in [foreign.as_str(), "not.a.valid.jwt.token", ""] {
        let err = auth_service.authenticate(token).unwrap_err();
        assert!(matches!(
            err,
            ServerError::Domain(CadenceError::Unauthenticated(_))
        ));
    }
}

// Helper functions

fn create_test_auth_service() -> AuthService {
    AuthService::new(&common::auth_settings()).with_hash_cost(4)
}

async fn add_user(storage: &Storage, auth_service: &AuthService, username: &str) -> UserId {
    let password_hash = auth_service.hash_password("TestPassword123!").unwrap();
    storage
        .users()
        .add_user(&CreateUser {
            username: username.to_string(),
            password_hash,
            fullname: "Test User".to_string(),
        })
        .await
        .unwrap()
}

async fn open_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_url = format!("sqlite://{}", temp_dir.path().join("auth.db").display());
    let storage = Storage::open(&db_url, Arc::new(MemoryCache::new(64)))
        .await
        .unwrap();
    (storage, temp_dir)
}
