//! DHM Agent - Main entry point
//!
//! Scans the local hardware inventory and syncs it to the collector on a
//! fixed interval.

mod config;
mod scheduler;
mod transport;

use anyhow::{Context, Result};
use clap::Parser;
use dhm_discovery::{EnumerationBackend, InventoryScanner, SnapshotBackend, WmiBackend};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::transport::SyncClient;

#[derive(Parser, Debug)]
#[command(name = "dhm-agent")]
#[command(about = "Hardware inventory agent for the DHM collector")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "dhm-agent.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Collector sync endpoint
    #[arg(long)]
    server_url: Option<String>,

    /// Replay a recorded inventory snapshot instead of querying the host
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Run a single scan, print the report and exit without syncing
    #[arg(long)]
    scan_once: bool,

    /// Write a default configuration file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("DHM agent v{}", env!("CARGO_PKG_VERSION"));

    if args.init_config {
        config::save_default_config(&args.config)?;
        info!(path = %args.config.display(), "Wrote default configuration");
        return Ok(());
    }

    let mut config = config::load_config(&args.config)?;
    if let Some(url) = args.server_url {
        config.server.url = url;
    }
    if let Some(snapshot) = args.snapshot {
        config.scan.snapshot = Some(snapshot);
    }

    let backend: Box<dyn EnumerationBackend> = match &config.scan.snapshot {
        Some(path) => Box::new(
            SnapshotBackend::from_file(path)
                .with_context(|| format!("Failed to load snapshot {}", path.display()))?,
        ),
        None => {
            if !WmiBackend::is_supported() {
                warn!("Live inventory needs Windows; use --snapshot to replay a recorded one");
            }
            Box::new(WmiBackend::new())
        }
    };

    let scanner_config = config.to_scanner_config();
    info!(
        host = %scanner_config.hostname,
        backend = backend.name(),
        interval_secs = config.agent.sync_interval_secs,
        "Configuration loaded"
    );
    let scanner = Arc::new(InventoryScanner::new(backend, scanner_config));

    if args.scan_once {
        // Single scan mode
        let scanner = Arc::clone(&scanner);
        let report = tokio::task::spawn_blocking(move || scanner.scan_once()).await??;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let client = SyncClient::new(config.server.url.clone(), config.request_timeout())?;
    scheduler::run(scanner, client, config.sync_interval()).await;

    info!("DHM agent stopped");
    Ok(())
}
