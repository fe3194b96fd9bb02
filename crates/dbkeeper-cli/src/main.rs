use std::env;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use dbkeeper::{ConnectionRegistry, PoolConfig};
use tracing_subscriber::EnvFilter;

/// Initialize a named connection from DATABASE_URL and run one diagnostic
/// query through the registry-managed handle.
#[derive(Parser)]
#[command(name = "dbkeeper")]
#[command(about = "Registry-backed database connection check")]
struct Cli {
    /// Connection name to register and fetch
    #[arg(long, default_value = "primary")]
    name: String,

    /// Diagnostic query; must return a single integer column
    #[arg(long, default_value = "SELECT COUNT(*) FROM information_schema.tables")]
    query: String,

    /// Maximum open connections in the pool
    #[arg(long, default_value_t = 12)]
    max_open: u32,

    /// Maximum idle connections held ready
    #[arg(long, default_value_t = 10)]
    max_idle: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

    let config = PoolConfig::new(database_url)
        .with_max_open(cli.max_open)
        .with_max_idle(cli.max_idle)
        .with_max_lifetime(Duration::from_secs(300))
        .with_max_idle_time(Duration::from_secs(60));

    // Composition root: the one registry this process uses.
    let registry = ConnectionRegistry::postgres();
    registry
        .initialize(&cli.name, config)
        .await
        .with_context(|| format!("initializing connection '{}'", cli.name))?;

    let db = registry
        .get(&cli.name)
        .await
        .with_context(|| format!("fetching connection '{}'", cli.name))?;

    let count = db
        .fetch_scalar(&cli.query)
        .await
        .with_context(|| format!("running diagnostic query on '{}'", cli.name))?;
    tracing::info!("{}: diagnostic query returned {}", cli.name, count);

    registry.close_all().await;
    Ok(())
}
