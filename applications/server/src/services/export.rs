//! Playlist export queue
//!
//! Handlers publish export requests through [`ExportProducer`]; the shipped
//! producer is an in-process bounded channel drained by a single worker that
//! renders the playlist to a JSON file.

use crate::error::{Result, ServerError};
use async_trait::async_trait;
use cadence_core::PlaylistId;
use cadence_storage::Storage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// Queue that playlist export requests are published to
pub const PLAYLIST_EXPORT_QUEUE: &str = "export:playlists";

/// Message published for one export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub playlist_id: PlaylistId,
    pub target_email: String,
}

/// Publishes serialized messages to a named queue
#[async_trait]
pub trait ExportProducer: Send + Sync {
    async fn send_message(&self, queue: &str, message: String) -> Result<()>;
}

/// In-process export queue with one background worker
pub struct ExportQueue {
    sender: Mutex<Option<mpsc::Sender<String>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ExportQueue {
    /// Spawn the worker and return the producer handle
    pub fn start(storage: Storage, export_path: PathBuf, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        let worker = tokio::spawn(async move {
            tracing::info!(path = %export_path.display(), "export worker started");
            worker_loop(storage, export_path, receiver).await;
            tracing::info!("export worker stopped");
        });

        Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Stop accepting messages and wait for queued exports to finish
    pub async fn shutdown(&self) {
        self.sender.lock().await.take();

        if let Some(worker) = self.worker.lock().await.take() {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "export worker panicked");
            }
        }
    }
}

#[async_trait]
impl ExportProducer for ExportQueue {
    async fn send_message(&self, queue: &str, message: String) -> Result<()> {
        if queue != PLAYLIST_EXPORT_QUEUE {
            return Err(ServerError::Export(format!("Unknown queue: {queue}")));
        }

        let sender = self
            .sender
            .lock()
            .await
            .clone()
            .ok_or_else(|| ServerError::Export("Export queue is closed".to_string()))?;

        sender
            .send(message)
            .await
            .map_err(|_| ServerError::Export("Export worker is gone".to_string()))
    }
}

async fn worker_loop(storage: Storage, export_path: PathBuf, mut receiver: mpsc::Receiver<String>) {
    while let Some(message) = receiver.recv().await {
        match export_playlist(&storage, &export_path, &message).await {
            Ok(path) => tracing::info!(path = %path.display(), "playlist exported"),
            Err(e) => tracing::error!(error = %e, "playlist export failed"),
        }
    }
}

/// Render one export request to `<export_path>/<playlistId>-<millis>.json`
pub async fn export_playlist(storage: &Storage, export_path: &Path, message: &str) -> Result<PathBuf> {
    let request: ExportRequest = serde_json::from_str(message)
        .map_err(|e| ServerError::Export(format!("Malformed export message: {e}")))?;

    let playlist = storage
        .playlists()
        .get_playlist_with_songs(&request.playlist_id)
        .await?;

    let document = serde_json::json!({
        "targetEmail": request.target_email,
        "playlist": playlist,
    });
    let rendered = serde_json::to_vec_pretty(&document)
        .map_err(|e| ServerError::Export(e.to_string()))?;

    tokio::fs::create_dir_all(export_path).await?;
    let path = export_path.join(format!(
        "{}-{}.json",
        request.playlist_id,
        chrono::Utc::now().timestamp_millis()
    ));
    tokio::fs::write(&path, rendered).await?;

    Ok(path)
}
