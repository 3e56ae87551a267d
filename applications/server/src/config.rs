/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,

    #[serde(default = "default_cache")]
    pub cache: CacheSettings,

    #[serde(default = "default_export")]
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL used when handing out links to uploaded files
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_upload_path")]
    pub upload_path: PathBuf,

    #[serde(default = "default_export_path")]
    pub export_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    /// Signs access tokens
    #[serde(default)]
    pub access_token_key: String,

    /// Signs refresh tokens; must differ from the access key
    #[serde(default)]
    pub refresh_token_key: String,

    #[serde(default = "default_access_token_minutes")]
    pub access_token_minutes: u64,

    #[serde(default = "default_refresh_token_days")]
    pub refresh_token_days: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheSettings {
    /// When false every read goes to the database
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Maximum number of cached projections
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportSettings {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl ServerConfig {
    /// Load configuration from file and environment
    ///
    /// `path` defaults to `config.toml` in the working directory; a missing
    /// file is not an error. `CADENCE_`-prefixed variables win over the file,
    /// with `__` between section and key (`CADENCE_AUTH__ACCESS_TOKEN_KEY`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        let config_path = path.map_or_else(|| PathBuf::from("config.toml"), Path::to_path_buf);
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        } else if path.is_some() {
            return Err(ServerError::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.access_token_key.is_empty() || self.auth.refresh_token_key.is_empty() {
            return Err(ServerError::Config(
                "Token keys are required (set CADENCE_AUTH__ACCESS_TOKEN_KEY and CADENCE_AUTH__REFRESH_TOKEN_KEY)"
                    .to_string(),
            ));
        }

        if self.auth.access_token_key == self.auth.refresh_token_key {
            return Err(ServerError::Config(
                "auth.access_token_key and auth.refresh_token_key must differ".to_string(),
            ));
        }

        if self.auth.access_token_minutes == 0 {
            return Err(ServerError::Config(
                "auth.access_token_minutes must be greater than zero".to_string(),
            ));
        }

        if self.cache.enabled && self.cache.capacity == 0 {
            return Err(ServerError::Config(
                "cache.capacity must be greater than zero when the cache is enabled".to_string(),
            ));
        }

        if self.export.queue_capacity == 0 {
            return Err(ServerError::Config(
                "export.queue_capacity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
        public_url: default_public_url(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_public_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        upload_path: default_upload_path(),
        export_path: default_export_path(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/cadence.db".to_string()
}

fn default_upload_path() -> PathBuf {
    PathBuf::from("./data/uploads")
}

fn default_export_path() -> PathBuf {
    PathBuf::from("./data/exports")
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        access_token_key: String::new(),
        refresh_token_key: String::new(),
        access_token_minutes: default_access_token_minutes(),
        refresh_token_days: default_refresh_token_days(),
    }
}

fn default_access_token_minutes() -> u64 {
    30
}

fn default_refresh_token_days() -> u64 {
    30
}

fn default_cache() -> CacheSettings {
    CacheSettings {
        enabled: default_cache_enabled(),
        capacity: default_cache_capacity(),
    }
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    10_000
}

fn default_export() -> ExportSettings {
    ExportSettings {
        queue_capacity: default_queue_capacity(),
    }
}

fn default_queue_capacity() -> usize {
    64
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            auth: default_auth(),
            cache: default_cache(),
            export: default_export(),
        }
    }
}
