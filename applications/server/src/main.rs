/// Cadence Server - music catalog backend
use cadence_core::{CacheStore, CreateUser};
use cadence_server::{
    config::ServerConfig,
    create_router,
    services::{AuthService, CoverStorage, ExportProducer, ExportQueue},
    state::AppState,
};
use cadence_storage::{
    cache::{MemoryCache, NoCache},
    Storage,
};
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence-server")]
#[command(about = "Cadence music catalog server", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./config.toml when present)
    #[arg(short, long, global = true, env = "CADENCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Apply database migrations and exit
    Migrate,
    /// Create a new user
    AddUser {
        /// Username
        #[arg(short, long)]
        username: String,
        /// Password
        #[arg(short, long)]
        password: String,
        /// Full name
        #[arg(short, long)]
        fullname: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cadence_server=info,cadence_storage=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::Migrate => migrate(&config).await?,
        Commands::AddUser {
            username,
            password,
            fullname,
        } => add_user(config, username, &password, fullname).await?,
    }

    Ok(())
}

fn build_cache(config: &ServerConfig) -> Arc<dyn CacheStore> {
    if config.cache.enabled {
        tracing::info!(capacity = config.cache.capacity, "memory cache enabled");
        Arc::new(MemoryCache::new(config.cache.capacity))
    } else {
        tracing::info!("cache disabled");
        Arc::new(NoCache)
    }
}

fn build_auth(config: &ServerConfig) -> AuthService {
    AuthService::new(&config.auth)
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting Cadence Server");

    let storage = Storage::open(&config.storage.database_url, build_cache(&config)).await?;
    tracing::info!("Database connected");

    let cover_storage = CoverStorage::new(
        config.storage.upload_path.clone(),
        config.server.public_url.clone(),
    );
    cover_storage.initialize().await?;
    tracing::info!(path = %config.storage.upload_path.display(), "cover storage initialized");

    let auth_service = Arc::new(build_auth(&config));

    let exports = Arc::new(ExportQueue::start(
        storage.clone(),
        config.storage.export_path.clone(),
        config.export.queue_capacity,
    ));

    let producer: Arc<dyn ExportProducer> = exports.clone();
    let app_state = AppState::new(
        storage.clone(),
        auth_service,
        Arc::new(cover_storage),
        producer,
    );
    let app = create_router(app_state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    exports.shutdown().await;
    storage.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

async fn migrate(config: &ServerConfig) -> anyhow::Result<()> {
    let pool = cadence_storage::create_pool(&config.storage.database_url).await?;
    cadence_storage::run_migrations(&pool).await?;
    pool.close().await;

    tracing::info!("Migrations applied");
    Ok(())
}

async fn add_user(
    config: ServerConfig,
    username: String,
    password: &str,
    fullname: String,
) -> anyhow::Result<()> {
    let storage = Storage::open(&config.storage.database_url, Arc::new(NoCache)).await?;
    let password_hash = build_auth(&config).hash_password(password)?;

    let user_id = storage
        .users()
        .add_user(&CreateUser {
            username: username.clone(),
            password_hash,
            fullname,
        })
        .await?;
    storage.close().await;

    println!("Created user {username} ({user_id})");
    Ok(())
}
