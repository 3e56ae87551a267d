/// Common test utilities and fixtures
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use cadence_server::{
    config::AuthSettings,
    create_router,
    services::{AuthService, CoverStorage, ExportProducer},
    state::AppState,
};
use cadence_storage::{cache::MemoryCache, Storage};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        access_token_key: "test-access-key".to_string(),
        refresh_token_key: "test-refresh-key".to_string(),
        access_token_minutes: 30,
        refresh_token_days: 1,
    }
}
pub const PUBLIC_URL: &str = "http://localhost:5000";

/// Producer that keeps every published message in memory
#[derive(Default)]
pub struct RecordingProducer {
    pub messages: Mutex<Vec<(String, String)>>,
}

impl RecordingProducer {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExportProducer for RecordingProducer {
    async fn send_message(&self, queue: &str, message: String) -> cadence_server::Result<()> {
        self.messages
            .lock()
            .unwrap()
            .push((queue.to_string(), message));
        Ok(())
    }
}

/// Router over a temp-file database, a live memory cache and temp uploads
pub struct TestApp {
    pub router: Router,
    pub storage: Storage,
    pub cache: Arc<MemoryCache>,
    pub auth: Arc<AuthService>,
    pub exports: Arc<RecordingProducer>,
    pub upload_dir: TempDir,
    _db_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_dir = TempDir::new().unwrap();
        let db_url = format!("sqlite://{}", db_dir.path().join("test.db").display());

        let cache = Arc::new(MemoryCache::new(256));
        let storage = Storage::open(&db_url, cache.clone()).await.unwrap();

        let upload_dir = TempDir::new().unwrap();
        let cover_storage = CoverStorage::new(upload_dir.path().to_path_buf(), PUBLIC_URL);
        cover_storage.initialize().await.unwrap();

        // Minimum bcrypt cost keeps the suite fast
        let auth = Arc::new(AuthService::new(&auth_settings()).with_hash_cost(4));
        let exports = Arc::new(RecordingProducer::default());

        let app_state = AppState::new(
            storage.clone(),
            Arc::clone(&auth),
            Arc::new(cover_storage),
            exports.clone(),
        );

        Self {
            router: create_router(app_state),
            storage,
            cache,
            auth,
            exports,
            upload_dir,
            _db_dir: db_dir,
        }
    }

    /// Send a request and decode the JSON body (`Null` when empty or not JSON)
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    /// Register through the API and log in; returns `(user_id, access_token)`
    pub async fn register_and_login(&self, username: &str) -> (String, String) {
        let (status, _, body) = self
            .send(json_request(
                "POST",
                "/users",
                None,
                &serde_json::json!({
                    "username": username,
                    "password": "secret-password",
                    "fullname": format!("{username} fullname"),
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let user_id = body["data"]["userId"].as_str().unwrap().to_string();

        let (status, _, body) = self
            .send(json_request(
                "POST",
                "/authentications",
                None,
                &serde_json::json!({ "username": username, "password": "secret-password" }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "login failed: {body}");
        let token = body["data"]["accessToken"].as_str().unwrap().to_string();

        (user_id, token)
    }

    /// Create a song through the API and return its id
    pub async fn create_song(&self, title: &str) -> String {
        let (status, _, body) = self
            .send(json_request(
                "POST",
                "/songs",
                None,
                &serde_json::json!({
                    "title": title,
                    "year": 2015,
                    "genre": "Indie",
                    "performer": "Test Performer",
                    "duration": 240,
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create song failed: {body}");
        body["data"]["songId"].as_str().unwrap().to_string()
    }

    /// Create a playlist owned by the token's user and return its id
    pub async fn create_playlist(&self, token: &str, name: &str) -> String {
        let (status, _, body) = self
            .send(json_request(
                "POST",
                "/playlists",
                Some(token),
                &serde_json::json!({ "name": name }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create playlist failed: {body}");
        body["data"]["playlistId"].as_str().unwrap().to_string()
    }
}

/// Request with a JSON body and optional bearer token
pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Body-less request with optional bearer token
pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Single-field multipart upload
pub fn multipart_request(uri: &str, field: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let boundary = "cadence-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"upload\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}
