//! Kafka consumer implementation for the event indexer.
//!
//! Polls events from a single Kafka topic. Offsets are only ever committed
//! explicitly by the ingestion loop.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    consumer::{CommitMode, Consumer, StreamConsumer},
    message::{BorrowedMessage, Message as KafkaMessage},
    Offset, TopicPartitionList,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::KafkaSettings;
use crate::consumer::messages::{CycleOffsets, Event, PollOutcome};
use crate::consumer::EventSource;
use crate::errors::IngestError;

/// Timeout for seeking a partition back after a failed write.
const SEEK_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause after a consumer error before receiving again.
const POLL_ERROR_BACKOFF: Duration = Duration::from_millis(200);

/// How long to pause after a consumer error, never past the poll deadline.
fn error_backoff(remaining: Duration) -> Duration {
    POLL_ERROR_BACKOFF.min(remaining)
}

/// Kafka-backed event source.
pub struct KafkaEventSource {
    consumer: StreamConsumer,
    topic: String,
    max_poll_records: usize,
    fetch_linger: Duration,
}

impl KafkaEventSource {
    /// Create a new Kafka consumer.
    ///
    /// The consumer joins `settings.group_id`, starts from the latest offset when
    /// the group has no checkpoint yet, and never commits on its own.
    ///
    /// # Returns
    ///
    /// * `Ok(KafkaEventSource)` - A new consumer instance
    /// * `Err(IngestError)` - If consumer creation fails
    pub fn new(settings: &KafkaSettings) -> Result<Self, IngestError> {
        let consumer: StreamConsumer = Self::client_config(settings)
            .create()
            .map_err(|e| IngestError::kafka(e.to_string()))?;

        info!(
            brokers = %settings.brokers,
            group_id = %settings.group_id,
            topic = %settings.topic,
            max_poll_records = settings.max_poll_records,
            "Created Kafka consumer"
        );

        Ok(Self {
            consumer,
            topic: settings.topic.clone(),
            max_poll_records: settings.max_poll_records,
            fetch_linger: settings.fetch_linger,
        })
    }

    fn client_config(settings: &KafkaSettings) -> ClientConfig {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &settings.brokers)
            .set("group.id", &settings.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "latest")
            .set("session.timeout.ms", "6000");

        // SASL/SSL for managed clusters, plaintext otherwise
        if let Some(credentials) = &settings.credentials {
            client_config
                .set("security.protocol", "SASL_SSL")
                .set("sasl.mechanisms", "PLAIN")
                .set("sasl.username", &credentials.username)
                .set("sasl.password", &credentials.password);
        }

        client_config
    }

    fn to_event(msg: &BorrowedMessage<'_>) -> Event {
        Event {
            topic: msg.topic().to_string(),
            partition: msg.partition(),
            offset: msg.offset(),
            key: msg.key().map(|k| String::from_utf8_lossy(k).into_owned()),
            payload: msg.payload().map(|p| String::from_utf8_lossy(p).into_owned()),
        }
    }
}

#[async_trait]
impl EventSource for KafkaEventSource {
    fn subscribe(&self) -> Result<(), IngestError> {
        self.consumer
            .subscribe(&[self.topic.as_str()])
            .map_err(|e| IngestError::kafka(e.to_string()))?;

        info!(topic = %self.topic, "Subscribed to Kafka topic");
        Ok(())
    }

    /// Gather events until the deadline, the record limit, or a quiet period.
    ///
    /// The first event is awaited for up to `timeout`. Once one has arrived,
    /// each further event is awaited for at most the fetch linger, so a busy
    /// topic returns full batches and a quiet one returns without waiting out
    /// the whole timeout.
    #[instrument(skip(self, shutdown), level = "debug")]
    async fn poll(
        &self,
        timeout: Duration,
        shutdown: &CancellationToken,
    ) -> Result<PollOutcome, IngestError> {
        let deadline = Instant::now() + timeout;
        let mut events = Vec::new();

        while events.len() < self.max_poll_records {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let wait = if events.is_empty() {
                remaining
            } else {
                self.fetch_linger.min(remaining)
            };

            let mut pause = None;
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    // Uncommitted, so they are delivered again after restart
                    debug!(discarded = events.len(), "Poll interrupted by shutdown signal");
                    return Ok(PollOutcome::Cancelled);
                }
                received = tokio::time::timeout(wait, self.consumer.recv()) => match received {
                    Err(_) => break,
                    Ok(Ok(msg)) => events.push(Self::to_event(&msg)),
                    Ok(Err(e)) => {
                        warn!(error = %e, "Kafka error while polling");
                        if !events.is_empty() {
                            break;
                        }
                        pause = Some(error_backoff(deadline.saturating_duration_since(Instant::now())));
                    }
                }
            }

            if let Some(pause) = pause {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => return Ok(PollOutcome::Cancelled),
                    _ = tokio::time::sleep(pause) => {}
                }
            }
        }

        Ok(PollOutcome::Events(events))
    }

    async fn commit(&self, offsets: &CycleOffsets) -> Result<(), IngestError> {
        if offsets.is_empty() {
            return Ok(());
        }

        let mut tpl = TopicPartitionList::new();
        for (topic, partition, position) in offsets.commit_positions() {
            tpl.add_partition_offset(topic, partition, Offset::Offset(position))?;
        }

        // librdkafka blocks until the coordinator acknowledges a sync commit
        tokio::task::block_in_place(|| self.consumer.commit(&tpl, CommitMode::Sync))?;

        debug!(partition_count = offsets.len(), "Committed offsets");
        Ok(())
    }

    async fn rewind(&self, offsets: &CycleOffsets) -> Result<(), IngestError> {
        for (topic, partition, position) in offsets.rewind_positions() {
            tokio::task::block_in_place(|| {
                self.consumer
                    .seek(topic, partition, Offset::Offset(position), SEEK_TIMEOUT)
            })?;
            debug!(topic = %topic, partition = partition, offset = position, "Rewound partition");
        }
        Ok(())
    }
}

impl Drop for KafkaEventSource {
    fn drop(&mut self) {
        self.consumer.unsubscribe();
        info!(topic = %self.topic, "Kafka consumer released");
    }
}
