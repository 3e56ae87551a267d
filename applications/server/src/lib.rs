//! Cadence Server Library
//!
//! HTTP backend for the Cadence music catalog: songs, albums, playlists with
//! collaborators, and playlist exports.
//!
//! This library exposes the router and its components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use services::{AuthService, CoverStorage, ExportProducer, ExportQueue};
pub use state::AppState;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the application router
pub fn create_router(app_state: AppState) -> Router {
    let uploads = ServeDir::new(app_state.cover_storage.base_path());

    Router::new()
        .route("/health", get(api::health::health))
        // Users
        .route(
            "/users",
            post(api::users::register).get(api::users::search_users),
        )
        .route("/users/:id", get(api::users::get_user))
        // Authentications
        .route(
            "/authentications",
            post(api::authentications::login)
                .put(api::authentications::refresh)
                .delete(api::authentications::logout),
        )
        // Albums
        .route("/albums", post(api::albums::create_album))
        .route(
            "/albums/:id",
            get(api::albums::get_album)
                .put(api::albums::update_album)
                .delete(api::albums::delete_album),
        )
        .route("/albums/:id/covers", post(api::albums::upload_cover))
        .route(
            "/albums/:id/likes",
            post(api::albums::like_album)
                .delete(api::albums::unlike_album)
                .get(api::albums::get_album_likes),
        )
        // Songs
        .route(
            "/songs",
            post(api::songs::create_song).get(api::songs::list_songs),
        )
        .route(
            "/songs/:id",
            get(api::songs::get_song)
                .put(api::songs::update_song)
                .delete(api::songs::delete_song),
        )
        // Playlists
        .route(
            "/playlists",
            post(api::playlists::create_playlist).get(api::playlists::list_playlists),
        )
        .route(
            "/playlists/:id",
            delete(api::playlists::delete_playlist),
        )
        .route(
            "/playlists/:id/songs",
            post(api::playlists::add_song)
                .get(api::playlists::get_songs)
                .delete(api::playlists::remove_song),
        )
        .route(
            "/playlists/:id/activities",
            get(api::playlists::get_activities),
        )
        // Collaborations
        .route(
            "/collaborations",
            post(api::collaborations::add_collaboration)
                .delete(api::collaborations::delete_collaboration),
        )
        // Exports
        .route(
            "/export/playlists/:id",
            post(api::exports::export_playlist),
        )
        .nest_service("/uploads", uploads)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
