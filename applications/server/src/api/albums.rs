/// Albums API routes
use crate::{
    api::{created, require, success, success_message},
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    services::CoverStorage,
    state::AppState,
};
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cadence_core::types::{AlbumId, CreateAlbum, UpdateAlbum};
use serde_json::{json, Value};

/// Header telling clients the like count came from the cache
pub const DATA_SOURCE_HEADER: &str = "X-Data-Source";

/// Multipart field carrying the cover image
const COVER_FIELD: &str = "cover";

fn validate(album: &CreateAlbum) -> Result<()> {
    require("name", &album.name)
}

/// POST /albums
pub async fn create_album(
    State(app_state): State<AppState>,
    Json(req): Json<CreateAlbum>,
) -> Result<(StatusCode, Json<Value>)> {
    validate(&req)?;
    let album_id = app_state.storage.albums().add_album(&req).await?;
    Ok(created("Album added successfully", json!({ "albumId": album_id })))
}

/// GET /albums/:id
pub async fn get_album(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let album = app_state.storage.albums().get_album(&AlbumId::new(id)).await?;
    Ok(success(json!({ "album": album })))
}

/// PUT /albums/:id
pub async fn update_album(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAlbum>,
) -> Result<Json<Value>> {
    validate(&req)?;
    app_state
        .storage
        .albums()
        .edit_album(&AlbumId::new(id), &req)
        .await?;
    Ok(success_message("Album has been updated"))
}

/// DELETE /albums/:id
pub async fn delete_album(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    app_state.storage.albums().delete_album(&AlbumId::new(id)).await?;
    Ok(success_message("Album has been deleted"))
}

fn multipart_error(err: MultipartError) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(err.body_text())
    } else {
        ServerError::BadRequest(err.body_text())
    }
}

/// POST /albums/:id/covers
///
/// Multipart upload with an image in the `cover` field.
pub async fn upload_cover(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>)> {
    let album_id = AlbumId::new(id);
    app_state.storage.albums().find_album(&album_id).await?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(COVER_FIELD) {
            continue;
        }

        // Reject by content type before reading the body
        let content_type = field.content_type().map(str::to_string);
        CoverStorage::check_cover(content_type.as_deref(), 0)?;

        let data = field.bytes().await.map_err(multipart_error)?;
        let cover_url = app_state
            .cover_storage
            .store_cover(&album_id, content_type.as_deref(), &data)
            .await?;

        app_state
            .storage
            .albums()
            .set_cover_url(&album_id, &cover_url)
            .await?;

        return Ok(created(
            "Cover uploaded successfully",
            json!({ "coverUrl": cover_url }),
        ));
    }

    Err(ServerError::BadRequest(format!("\"{COVER_FIELD}\" is required")))
}

/// POST /albums/:id/likes
pub async fn like_album(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Value>)> {
    app_state
        .storage
        .albums()
        .like_album(&AlbumId::new(id), auth.user_id())
        .await?;

    Ok((StatusCode::CREATED, success_message("Album liked")))
}

/// DELETE /albums/:id/likes
pub async fn unlike_album(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    app_state
        .storage
        .albums()
        .unlike_album(&AlbumId::new(id), auth.user_id())
        .await?;

    Ok(success_message("Album unliked"))
}

/// GET /albums/:id/likes
pub async fn get_album_likes(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let count = app_state
        .storage
        .albums()
        .get_album_likes(&AlbumId::new(id))
        .await?;

    let body = success(json!({ "likes": count.likes }));
    if count.from_cache {
        Ok(([(DATA_SOURCE_HEADER, "cache")], body).into_response())
    } else {
        Ok(body.into_response())
    }
}
