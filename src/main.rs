use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tier_engine::api::{AppState, create_router};
use tier_engine::config::ConfigLoader;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// HTTP server for progressive tax and commission calculations.
///
/// Loads the seed brackets and KPI tiers from a configuration directory and
/// serves the range management and calculation endpoints.
#[derive(Debug, Parser)]
struct Cli {
    /// Directory holding `server.yaml`, `tax_brackets.yaml` and `commission.yaml`.
    #[arg(long, default_value = "./config/default")]
    config: PathBuf,

    /// Address to listen on. Overrides `bind_address` from `server.yaml`.
    #[arg(long)]
    bind: Option<String>,
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// Honours `RUST_LOG` when set and falls back to `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    debug!(config_dir = %cli.config.display(), "loading configuration");
    let loader = ConfigLoader::load(&cli.config)?;
    let state = AppState::from_config(loader.config()).await?;

    let bind_address = cli
        .bind
        .unwrap_or_else(|| loader.config().server().bind_address.clone());
    let listener = TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "tier engine listening");

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
