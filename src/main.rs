use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use uptime_api::config::{AppConfig, Environment};
use uptime_api::server;
use uptime_api::state::AppContext;

#[derive(Parser)]
#[command(name = "uptime-api")]
#[command(about = "JSON API for users and session tokens backed by a file record store")]
#[command(version)]
struct Args {
    #[arg(long, env = "APP_ENV", help = "Configuration preset: staging or production")]
    env: Option<String>,

    #[arg(long, help = "Directory holding the record store")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Port for the plain HTTP listener")]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATA_DIR, HASHING_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match args.env.as_deref() {
        Some(name) => AppConfig::load(Environment::from_name(name)),
        None => AppConfig::from_env(),
    };
    if let Some(dir) = args.data_dir {
        config.storage.data_dir = dir;
    }
    if let Some(port) = args.http_port {
        config.server.http_port = port;
    }

    tracing::info!(
        "Starting uptime API in {:?} mode, records in {}",
        config.environment,
        config.storage.data_dir.display()
    );

    server::run(AppContext::new(config)).await
}
