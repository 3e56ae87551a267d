/// Cover storage service - manages uploaded album covers on disk
use crate::error::{Result, ServerError};
use cadence_core::AlbumId;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Largest accepted cover upload, in bytes
pub const MAX_COVER_BYTES: usize = 512_000;

const COVERS_DIR: &str = "covers";

#[derive(Debug, Clone)]
pub struct CoverStorage {
    base_path: PathBuf,
    public_url: String,
}

impl CoverStorage {
    /// `base_path` is served at `<public_url>/uploads`
    pub fn new(base_path: PathBuf, public_url: impl Into<String>) -> Self {
        Self {
            base_path,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Initialize storage directories
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(self.base_path.join(COVERS_DIR)).await?;
        Ok(())
    }

    /// Reject anything that is not an image or is over [`MAX_COVER_BYTES`]
    pub fn check_cover(content_type: Option<&str>, len: usize) -> Result<()> {
        match content_type {
            Some(ct) if ct.starts_with("image/") => {}
            _ => {
                return Err(ServerError::BadRequest(
                    "Cover must be an image".to_string(),
                ))
            }
        }

        if len > MAX_COVER_BYTES {
            return Err(ServerError::PayloadTooLarge(format!(
                "Cover exceeds {MAX_COVER_BYTES} bytes"
            )));
        }

        Ok(())
    }

    /// Store a cover and return its public URL
    pub async fn store_cover(
        &self,
        album_id: &AlbumId,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<String> {
        Self::check_cover(content_type, data.len())?;

        let extension = content_type
            .and_then(extension_for)
            .unwrap_or("img");
        let filename = format!(
            "{}-{}.{}",
            album_id.as_str(),
            chrono::Utc::now().timestamp_millis(),
            extension
        );
        let path = self.base_path.join(COVERS_DIR).join(&filename);

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&path, data).await?;
        tracing::debug!(album_id = %album_id, path = %path.display(), "cover stored");

        Ok(format!("{}/uploads/{}/{}", self.public_url, COVERS_DIR, filename))
    }
}

/// Preferred file extension for an image content type
fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or(content_type).trim();
    if essence == "image/jpeg" {
        return Some("jpg");
    }
    mime_guess::get_mime_extensions_str(essence).and_then(|exts| exts.first().copied())
}
