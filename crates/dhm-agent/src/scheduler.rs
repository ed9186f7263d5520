//! Periodic scan-and-sync loop

use anyhow::{Context, Result};
use dhm_discovery::InventoryScanner;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::transport::{SyncAck, SyncClient};

/// Run one scan on the blocking pool and send the result
pub async fn sync_once(scanner: &Arc<InventoryScanner>, client: &SyncClient) -> Result<SyncAck> {
    let scanner = Arc::clone(scanner);
    let report = tokio::task::spawn_blocking(move || scanner.scan_once())
        .await
        .context("Scan task panicked")??;

    for degradation in &report.degraded {
        warn!(
            source = %degradation.source,
            subject = degradation.subject.as_deref().unwrap_or("-"),
            reason = %degradation.reason,
            "Degraded enrichment source"
        );
    }

    Ok(client.send(&report).await?)
}

/// Scan and sync every `period` until Ctrl-C
pub async fn run(scanner: Arc<InventoryScanner>, client: SyncClient, period: Duration) {
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    run_until(scanner, client, period, shutdown).await;
}

/// Scan and sync every `period` until `shutdown` resolves
///
/// The first tick fires immediately. Failures are logged and the next tick
/// is the retry.
pub async fn run_until(
    scanner: Arc<InventoryScanner>,
    client: SyncClient,
    period: Duration,
    shutdown: impl Future<Output = ()>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!(
        url = %client.url(),
        interval_secs = period.as_secs(),
        "Sync scheduler started"
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping scheduler");
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = sync_once(&scanner, &client).await {
                    warn!(error = %format!("{:#}", e), "Inventory sync failed");
                }
            }
        }
    }
}
