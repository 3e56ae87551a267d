/// Server services
pub mod auth;
pub mod export;
pub mod file_storage;

pub use auth::AuthService;
pub use export::{ExportProducer, ExportQueue, ExportRequest, PLAYLIST_EXPORT_QUEUE};
pub use file_storage::CoverStorage;
