//! gdg-vs-hosted - GoodDeedGo verification service, hosted variant
//!
//! Deployment variant A: photo verification through an external
//! vision-language endpoint, interpreted with the keyword rule set.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use gdg_common::config::GdgConfig;
use gdg_vs::services::blob_store::BlobStore;
use gdg_vs::services::hosted::HostedClassifier;
use gdg_vs::AppState;

#[derive(Debug, Parser)]
#[command(name = "gdg-vs-hosted", about = "GoodDeedGo verification service (hosted variant)")]
struct Args {
    /// Root data folder (database + uploads)
    #[arg(long)]
    root_folder: Option<PathBuf>,
    /// HTTP listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting gdg-vs (hosted verification variant)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = GdgConfig::resolve(args.root_folder.as_deref(), args.port);
    config
        .ensure_root_folder()
        .map_err(|e| anyhow::anyhow!("Failed to initialize root folder: {}", e))?;

    let (endpoint, api_key) = config.hosted_credentials()?;
    let backend = HostedClassifier::new(
        endpoint,
        api_key,
        Duration::from_secs(config.verify_timeout_secs),
    )
    .map_err(|e| anyhow::anyhow!("Failed to build hosted classifier: {}", e))?;

    let db_path = config.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = gdg_common::db::init_database(&db_path).await?;
    gdg_vs::db::challenges::seed_defaults(&db_pool).await?;

    let blob_store = BlobStore::new(config.uploads_dir());
    blob_store.ensure_exists()?;
    info!("Uploads folder: {}", config.uploads_dir().display());

    let state = AppState::new(db_pool, Arc::new(blob_store), Arc::new(backend));
    let app = gdg_vs::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.port)).await?;
    info!("Listening on http://127.0.0.1:{}", config.port);
    info!("Health check: http://127.0.0.1:{}/health", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
