//! Orchestrator module for the event indexer ingest.
//!
//! Runs the ingestion loop: poll, build a batch, write it, commit.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::config::IngestSettings;
use crate::consumer::{Event, EventSource, PollOutcome};
use crate::errors::IngestError;
use crate::loader::SearchLoader;
use crate::processor::EventProcessor;

/// Counters kept by the ingestion loop since startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Polls that returned at least one event.
    pub cycles: u64,
    pub events_received: u64,
    pub documents_indexed: u64,
    /// Events skipped because their payload was malformed.
    pub events_skipped: u64,
    /// Documents rejected inside an otherwise successful bulk write.
    pub item_failures: u64,
    pub commits: u64,
    /// Cycles whose bulk write failed and were left uncommitted.
    pub failed_writes: u64,
}

/// What happened in one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The poll returned no events.
    Idle,
    /// Every event was malformed; nothing was written or committed.
    NothingToWrite { skipped: usize },
    /// The batch was written; `committed` tells whether the commit went through.
    Written {
        indexed: usize,
        skipped: usize,
        failed_items: usize,
        committed: bool,
    },
    /// The bulk write failed; offsets were rewound instead of committed.
    WriteFailed { documents: usize },
}

/// The ingestion loop.
///
/// Exactly one cycle runs at a time and each cycle finishes its write and
/// commit before the next poll, so at most one batch is unacknowledged at any
/// moment. The loop owns both clients and drops them exactly once when `run`
/// returns, whatever the reason.
pub struct IngestionLoop {
    source: Box<dyn EventSource>,
    processor: EventProcessor,
    loader: SearchLoader,
    settings: IngestSettings,
    shutdown: CancellationToken,
    stats: IngestStats,
}

impl IngestionLoop {
    /// Create a new ingestion loop with the given components.
    pub fn new(
        source: Box<dyn EventSource>,
        processor: EventProcessor,
        loader: SearchLoader,
        settings: IngestSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            source,
            processor,
            loader,
            settings,
            shutdown,
            stats: IngestStats::default(),
        }
    }

    /// Run until the shutdown token fires or an unexpected error occurs.
    ///
    /// Shutdown is a normal exit and returns the final counters. Any other
    /// termination returns the error. The clients are released in both cases.
    pub async fn run(mut self) -> Result<IngestStats, IngestError> {
        info!(
            index = %self.loader.index_name(),
            poll_timeout_ms = self.settings.poll_timeout.as_millis() as u64,
            "Starting ingestion loop"
        );

        let result = self.consume().await;
        let stats = self.stats.clone();

        match &result {
            Ok(()) => info!(
                cycles = stats.cycles,
                events_received = stats.events_received,
                documents_indexed = stats.documents_indexed,
                events_skipped = stats.events_skipped,
                commits = stats.commits,
                failed_writes = stats.failed_writes,
                "Consumer is shutting down successfully"
            ),
            Err(e) => error!(error = %e, "Ingestion loop terminated unexpectedly"),
        }

        self.release();
        result.map(|()| stats)
    }

    async fn consume(&mut self) -> Result<(), IngestError> {
        self.source.subscribe()?;

        loop {
            let outcome = self
                .source
                .poll(self.settings.poll_timeout, &self.shutdown)
                .await?;

            match outcome {
                PollOutcome::Cancelled => return Ok(()),
                PollOutcome::Events(events) => {
                    let outcome = self.run_cycle(events).await?;
                    debug!(outcome = ?outcome, "Cycle finished");
                }
            }
        }
    }

    /// Transform, write and commit the events of one poll.
    ///
    /// Offsets are committed only after the bulk write succeeded. On a failed
    /// write the partitions are rewound so the next poll delivers the same
    /// events again.
    #[instrument(skip(self, events), fields(event_count = events.len()))]
    async fn run_cycle(&mut self, events: Vec<Event>) -> Result<CycleOutcome, IngestError> {
        if events.is_empty() {
            debug!("Received 0 record(s)");
            return Ok(CycleOutcome::Idle);
        }

        info!(count = events.len(), "Received {} record(s)", events.len());
        self.stats.cycles += 1;
        self.stats.events_received += events.len() as u64;

        let batch = self.processor.build_batch(&events);
        self.stats.events_skipped += batch.skipped as u64;

        if batch.is_empty() {
            warn!(
                skipped = batch.skipped,
                "No valid events in cycle, nothing written or committed"
            );
            return Ok(CycleOutcome::NothingToWrite {
                skipped: batch.skipped,
            });
        }

        let summary = match self.loader.write_batch(&batch).await {
            Ok(summary) => summary,
            Err(e) => {
                self.stats.failed_writes += 1;
                error!(
                    error = %e,
                    documents = batch.len(),
                    "Bulk write failed, offsets not committed"
                );
                self.source.rewind(&batch.offsets).await?;
                return Ok(CycleOutcome::WriteFailed {
                    documents: batch.len(),
                });
            }
        };

        self.stats.documents_indexed += summary.succeeded as u64;
        self.stats.item_failures += summary.failed as u64;
        info!(
            indexed = summary.succeeded,
            skipped = batch.skipped,
            failed = summary.failed,
            "{} indexed, {} skipped",
            summary.succeeded,
            batch.skipped
        );

        let committed = match self.source.commit(&batch.offsets).await {
            Ok(()) => {
                self.stats.commits += 1;
                info!(partition_count = batch.offsets.len(), "Offsets have been committed");
                true
            }
            Err(e) => {
                // The documents are written; a redelivery only overwrites them
                warn!(error = %e, "Failed to commit offsets");
                false
            }
        };

        debug!(stats = ?self.stats, "Cycle complete");
        Ok(CycleOutcome::Written {
            indexed: summary.succeeded,
            skipped: batch.skipped,
            failed_items: summary.failed,
            committed,
        })
    }

    fn release(self) {
        let Self { source, loader, .. } = self;
        drop(source);
        drop(loader);
        info!("Client connections released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumer::CycleOffsets;
    use async_trait::async_trait;
    use event_indexer_repository::{
        BulkIndexSummary, BulkItemResult, SearchIndexError, SearchIndexProvider,
    };
    use event_indexer_shared::IndexDocument;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingSource {
        commits: AtomicUsize,
        rewinds: AtomicUsize,
        fail_commit: bool,
    }

    #[async_trait]
    impl EventSource for Arc<RecordingSource> {
        fn subscribe(&self) -> Result<(), IngestError> {
            Ok(())
        }

        async fn poll(
            &self,
            _timeout: Duration,
            _shutdown: &CancellationToken,
        ) -> Result<PollOutcome, IngestError> {
            Ok(PollOutcome::Cancelled)
        }

        async fn commit(&self, _offsets: &CycleOffsets) -> Result<(), IngestError> {
            self.commits.fetch_add(1, Ordering::SeqCst);
            if self.fail_commit {
                return Err(IngestError::kafka("commit rejected"));
            }
            Ok(())
        }

        async fn rewind(&self, _offsets: &CycleOffsets) -> Result<(), IngestError> {
            self.rewinds.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct StubProvider {
        fail: bool,
    }

    #[async_trait]
    impl SearchIndexProvider for StubProvider {
        async fn index_exists(&self, _index: &str) -> Result<bool, SearchIndexError> {
            Ok(true)
        }

        async fn create_index(&self, _index: &str) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn bulk_index(
            &self,
            _index: &str,
            documents: &[IndexDocument],
        ) -> Result<BulkIndexSummary, SearchIndexError> {
            if self.fail {
                return Err(SearchIndexError::bulk_index("cluster unavailable"));
            }
            Ok(BulkIndexSummary::from_results(
                documents
                    .iter()
                    .map(|d| BulkItemResult {
                        id: d.id.clone(),
                        status: Some(201),
                        success: true,
                        error: None,
                    })
                    .collect(),
            ))
        }
    }

    fn ingestion(source: Arc<RecordingSource>, fail_writes: bool) -> IngestionLoop {
        IngestionLoop::new(
            Box::new(source),
            EventProcessor::new(),
            SearchLoader::new(Arc::new(StubProvider { fail: fail_writes }), "wikimedia"),
            IngestSettings {
                poll_timeout: Duration::from_millis(3000),
            },
            CancellationToken::new(),
        )
    }

    fn event(offset: i64, payload: &str) -> Event {
        Event::new("wikimedia.recentchange", 0, offset, Some(payload.to_string()))
    }

    #[tokio::test]
    async fn test_empty_poll_is_idle() {
        let source = Arc::new(RecordingSource::default());
        let mut ingestion = ingestion(source.clone(), false);

        let outcome = ingestion.run_cycle(Vec::new()).await.unwrap();

        assert_eq!(outcome, CycleOutcome::Idle);
        assert_eq!(ingestion.stats, IngestStats::default());
        assert_eq!(source.commits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_written_cycle_is_committed() {
        let source = Arc::new(RecordingSource::default());
        let mut ingestion = ingestion(source.clone(), false);

        let outcome = ingestion
            .run_cycle(vec![
                event(0, r#"{"meta":{"id":"a"}}"#),
                event(1, "not json"),
            ])
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CycleOutcome::Written {
                indexed: 1,
                skipped: 1,
                failed_items: 0,
                committed: true,
            }
        );
        assert_eq!(source.commits.load(Ordering::SeqCst), 1);
        assert_eq!(ingestion.stats.commits, 1);
    }

    #[tokio::test]
    async fn test_failed_write_rewinds_instead_of_committing() {
        let source = Arc::new(RecordingSource::default());
        let mut ingestion = ingestion(source.clone(), true);

        let outcome = ingestion
            .run_cycle(vec![event(0, r#"{"meta":{"id":"a"}}"#)])
            .await
            .unwrap();

        assert_eq!(outcome, CycleOutcome::WriteFailed { documents: 1 });
        assert_eq!(source.commits.load(Ordering::SeqCst), 0);
        assert_eq!(source.rewinds.load(Ordering::SeqCst), 1);
        assert_eq!(ingestion.stats.failed_writes, 1);
    }

    #[tokio::test]
    async fn test_commit_failure_is_not_fatal() {
        let source = Arc::new(RecordingSource {
            fail_commit: true,
            ..Default::default()
        });
        let mut ingestion = ingestion(source.clone(), false);

        let outcome = ingestion
            .run_cycle(vec![event(0, r#"{"meta":{"id":"a"}}"#)])
            .await
            .unwrap();

        assert!(matches!(outcome, CycleOutcome::Written { committed: false, .. }));
        assert_eq!(ingestion.stats.commits, 0);
        assert_eq!(ingestion.stats.documents_indexed, 1);
    }
}
