//! hostmon: a terminal host monitor with battery state inference.
//!
//! Run with:  `RUST_LOG=debug hostmon --interval 1000`

use anyhow::Result;
use clap::Parser;
use hostmon_poller::{OutputFormat, RunOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Poll host metrics and battery state")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/hostmon/hostmon.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Poll interval in milliseconds. Disables config live reload.
    #[arg(short, long)]
    interval: Option<u64>,

    /// Print one JSON object per frame.
    #[arg(long)]
    json: bool,

    /// Disable tier colors.
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for frames.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("hostmon v{} starting", env!("CARGO_PKG_VERSION"));

    hostmon_poller::run(RunOptions {
        config_path:       cli.config,
        interval_override: cli.interval,
        format:            if cli.json { OutputFormat::Json } else { OutputFormat::Text },
        color:             !cli.no_color && !cli.json,
    })
    .await
    .map_err(Into::into)
}
