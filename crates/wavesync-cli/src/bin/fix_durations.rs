use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use wavesync_cli::{init_tracing, report_lines};
use wavesync_core::Config;
use wavesync_services::{
    connect_document_store, AudioMetadataExtractor, CatalogRepository, ReconcileOptions,
    ReconciliationJob,
};

#[derive(Parser, Debug)]
#[command(name = "fix_durations")]
#[command(about = "Re-probe catalog entries whose duration is missing, zero or the 180s placeholder")]
struct Args {
    /// Probe and report without writing any update
    #[arg(long)]
    dry_run: bool,

    /// Minimum delay between remote probes (default: RECONCILE_INTERVAL_MS or 800)
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let store = connect_document_store(&config)
        .await
        .context("Failed to reach the document store")?;
    let probe = AudioMetadataExtractor::new(config.probe_settings().clone())
        .context("Failed to build HTTP client for duration probing")?;

    let options = ReconcileOptions {
        interval: args
            .interval_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.reconcile_interval()),
        dry_run: args.dry_run,
    };
    tracing::info!(
        interval_ms = options.interval.as_millis() as u64,
        dry_run = options.dry_run,
        "Starting duration reconciliation"
    );

    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received Ctrl+C; stopping after the current entry");
            on_signal.cancel();
        }
    });

    let job = ReconciliationJob::new(CatalogRepository::new(store), Arc::new(probe), options);
    let report = job.run(token).await?;

    for line in report_lines(&report) {
        tracing::info!("{}", line);
    }

    Ok(())
}
