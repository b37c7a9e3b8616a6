use crate::core::normalizer;
use crate::domain::model::{AddressRecord, RunSummary, UpsertOutcome};
use crate::domain::ports::{FeedSource, RecordSink};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<F: FeedSource, K: RecordSink> {
    source: F,
    sink: K,
    monitor: SystemMonitor,
}

impl<F: FeedSource, K: RecordSink> EtlEngine<F, K> {
    pub fn new(source: F, sink: K) -> Self {
        Self::new_with_monitoring(source, sink, false)
    }

    pub fn new_with_monitoring(source: F, sink: K, monitor_enabled: bool) -> Self {
        Self {
            source,
            sink,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Fetches the feed, normalizes it and upserts every record.
    ///
    /// Fetch errors abort the run. Individual upsert failures are logged and
    /// counted in `failed`; earlier upserts are not rolled back.
    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting blocklist ETL run");
        self.monitor.log_stats("Start");

        // Extract
        let lines = self.source.fetch_lines().await?;
        tracing::info!("Fetched {} feed lines", lines.len());
        self.monitor.log_stats("Extract");

        // Transform
        let report = normalizer::normalize_report(&lines);
        tracing::info!(
            "Normalized {} unique records ({} rejected, {} duplicates)",
            report.records.len(),
            report.rejected.len(),
            report.duplicates
        );
        self.monitor.log_stats("Transform");

        let mut summary = RunSummary {
            fetched_lines: lines.len(),
            records: report.records.len(),
            rejected: report.rejected.len(),
            duplicates: report.duplicates,
            skipped: report.skipped,
            ..RunSummary::default()
        };

        // Load
        self.load(&report.records, &mut summary).await;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(summary)
    }

    async fn load(&self, records: &[AddressRecord], summary: &mut RunSummary) {
        if records.is_empty() {
            tracing::info!("No records to upsert");
            return;
        }

        for record in records {
            match self.sink.upsert(record).await {
                Ok(UpsertOutcome::Inserted) => summary.inserted += 1,
                Ok(UpsertOutcome::Updated) => summary.updated += 1,
                Err(e) => {
                    tracing::error!("❌ Upsert failed for {}: {}", record.key(), e);
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            "Upserted {} records ({} new, {} updated, {} failed)",
            summary.inserted + summary.updated,
            summary.inserted,
            summary.updated,
            summary.failed
        );
    }
}
