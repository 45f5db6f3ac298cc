use super::throttle::MinIntervalThrottle;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use wavesync_core::constants::DEFAULT_RECONCILE_INTERVAL_MS;
use wavesync_core::models::{needs_fix, CatalogEntry, CatalogKind};
use wavesync_db::{CatalogRepository, DocumentStoreError};
use wavesync_processing::DurationProbe;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Failed to load collection '{collection}': {source}")]
    Query {
        collection: &'static str,
        #[source]
        source: DocumentStoreError,
    },
}

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Minimum spacing between consecutive probes.
    pub interval: Duration,
    /// Probe and report without writing.
    pub dry_run: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_RECONCILE_INTERVAL_MS),
            dry_run: false,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    pub fixed: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub tracks: CollectionSummary,
    pub episodes: CollectionSummary,
    /// The run stopped early on cancellation; remaining entries were not visited.
    pub cancelled: bool,
}

impl ReconciliationReport {
    fn summary_mut(&mut self, kind: CatalogKind) -> &mut CollectionSummary {
        match kind {
            CatalogKind::Track => &mut self.tracks,
            CatalogKind::Episode => &mut self.episodes,
        }
    }
}

enum Outcome {
    Fixed,
    Failed,
}

/// One-shot batch repair of stored durations.
///
/// Entries are processed strictly one at a time, tracks before episodes, so no two
/// writes to the same entry ever overlap. Re-running is safe: fixed entries no longer
/// match [`needs_fix`] and are skipped.
pub struct ReconciliationJob {
    catalog: CatalogRepository,
    probe: Arc<dyn DurationProbe>,
    options: ReconcileOptions,
}

impl ReconciliationJob {
    pub fn new(
        catalog: CatalogRepository,
        probe: Arc<dyn DurationProbe>,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            catalog,
            probe,
            options,
        }
    }

    /// Run over every collection. Only a failure to read a collection is fatal.
    #[tracing::instrument(skip(self, token), fields(dry_run = self.options.dry_run))]
    pub async fn run(&self, token: CancellationToken) -> Result<ReconciliationReport, ReconcileError> {
        let mut report = ReconciliationReport::default();
        let mut throttle = MinIntervalThrottle::new(self.options.interval);

        for kind in CatalogKind::ALL {
            let collection = kind.collection();
            let entries = self
                .catalog
                .list(kind)
                .await
                .map_err(|source| ReconcileError::Query { collection, source })?;

            let total = entries.len();
            tracing::info!(collection, total, "Reconciling collection");

            for (index, entry) in entries.iter().enumerate() {
                if token.is_cancelled() {
                    report.cancelled = true;
                    break;
                }

                if !needs_fix(entry.duration_seconds) || entry.audio_url.trim().is_empty() {
                    report.summary_mut(kind).skipped += 1;
                    continue;
                }

                if !throttle.ready(&token).await {
                    report.cancelled = true;
                    break;
                }

                tracing::info!(
                    collection,
                    position = index + 1,
                    total,
                    entry_id = %entry.id,
                    title = %entry.title,
                    "Re-probing duration"
                );

                let outcome = self.reconcile_entry(kind, entry).await;
                throttle.mark();

                let summary = report.summary_mut(kind);
                match outcome {
                    Outcome::Fixed => summary.fixed += 1,
                    Outcome::Failed => summary.failed += 1,
                }
            }

            let summary = report.summary_mut(kind);
            tracing::info!(
                collection,
                fixed = summary.fixed,
                skipped = summary.skipped,
                failed = summary.failed,
                "Collection reconciled"
            );

            if report.cancelled {
                tracing::warn!(collection, "Reconciliation cancelled");
                break;
            }
        }

        Ok(report)
    }

    async fn reconcile_entry(&self, kind: CatalogKind, entry: &CatalogEntry) -> Outcome {
        let result = match self.probe.probe(&entry.audio_url).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    entry_id = %entry.id,
                    url = %entry.audio_url,
                    "Duration probe failed"
                );
                return Outcome::Failed;
            }
        };

        if result.total_seconds == 0 {
            // Sub-second audio would still need a fix after writing
            tracing::warn!(entry_id = %entry.id, "Probed duration rounds down to zero");
            return Outcome::Failed;
        }

        if self.options.dry_run {
            tracing::info!(
                entry_id = %entry.id,
                previous = ?entry.duration_seconds,
                duration_secs = result.total_seconds,
                "Dry run: would update duration"
            );
            return Outcome::Fixed;
        }

        match self
            .catalog
            .update_duration(kind, &entry.id, &result, Utc::now())
            .await
        {
            Ok(()) => {
                tracing::info!(
                    entry_id = %entry.id,
                    duration_secs = result.total_seconds,
                    formatted = %result.formatted(),
                    "Duration updated"
                );
                Outcome::Fixed
            }
            Err(e) => {
                tracing::error!(error = %e, entry_id = %entry.id, "Failed to update duration");
                Outcome::Failed
            }
        }
    }
}
