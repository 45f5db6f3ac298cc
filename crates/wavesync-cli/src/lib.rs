//! Shared helpers for WaveSync command-line binaries.

use wavesync_services::{CollectionSummary, ReconciliationReport};

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn summary_line(label: &str, summary: &CollectionSummary) -> String {
    format!(
        "{}: {} fixed, {} skipped, {} failed",
        label, summary.fixed, summary.skipped, summary.failed
    )
}

/// Human-readable final summary, one line per collection.
pub fn report_lines(report: &ReconciliationReport) -> Vec<String> {
    let mut lines = vec![
        summary_line("tracks", &report.tracks),
        summary_line("podcasts", &report.episodes),
    ];
    if report.cancelled {
        lines.push("run cancelled before all entries were visited".to_string());
    }
    lines
}
