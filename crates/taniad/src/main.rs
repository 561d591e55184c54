//! Tania Daemon - agricultural catalog and mapping service
//!
//! Serves the pest/disease catalog, the commodity distribution map, and
//! the advisory chat endpoint over HTTP.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tania_common::catalog_db::CatalogDb;
use tania_common::config::TaniaConfig;
use taniad::{seed, server};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taniad")]
#[command(about = "Tania catalog daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the database path from the configuration
    #[arg(long)]
    db: Option<PathBuf>,

    /// Override the listen address from the configuration
    #[arg(long)]
    listen: Option<String>,

    /// Skip seeding the reference dataset even if the database is empty
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("Tania Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => TaniaConfig::load_from(path),
        None => TaniaConfig::load(),
    };
    if let Some(db) = cli.db {
        config.database.path = db;
    }
    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen;
    }

    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let db = CatalogDb::open_at(&config.database.path)?;
    info!("  Catalog database: {}", config.database.path.display());

    if db.is_empty()? {
        if config.database.seed_on_empty && !cli.no_seed {
            let pests = seed::seed(&db)?;
            info!("  Reference dataset loaded ({} pest entries)", pests);
        } else {
            warn!("  Database is empty and seeding is disabled");
        }
    }

    let state = server::AppState::new(db);
    server::run(state, &config.server.listen_addr).await
}
