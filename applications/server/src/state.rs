/// Shared application state
use crate::services::{AuthService, CoverStorage, ExportProducer};
use axum::extract::FromRef;
use cadence_storage::Storage;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub auth_service: Arc<AuthService>,
    pub cover_storage: Arc<CoverStorage>,
    pub exports: Arc<dyn ExportProducer>,
}

impl AppState {
    pub fn new(
        storage: Storage,
        auth_service: Arc<AuthService>,
        cover_storage: Arc<CoverStorage>,
        exports: Arc<dyn ExportProducer>,
    ) -> Self {
        Self {
            storage,
            auth_service,
            cover_storage,
            exports,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.auth_service)
    }
}
