//! Consumer module for the event indexer ingest.
//!
//! Provides the event source abstraction and its Kafka implementation.

mod kafka_consumer;
mod messages;

pub use kafka_consumer::KafkaEventSource;
pub use messages::{CycleOffsets, Event, OffsetRange, PollOutcome, TopicPartition};

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::errors::IngestError;

/// A partitioned, append-only source of events with consumer-group checkpoints.
///
/// The ingestion loop is the only caller of `commit`; implementations must not
/// advance checkpoints on their own.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Join the consumer group for the configured topic.
    fn subscribe(&self) -> Result<(), IngestError>;

    /// Wait up to `timeout` for events.
    ///
    /// Returns `PollOutcome::Cancelled` promptly once `shutdown` fires, even
    /// while waiting.
    async fn poll(
        &self,
        timeout: Duration,
        shutdown: &CancellationToken,
    ) -> Result<PollOutcome, IngestError>;

    /// Synchronously commit the positions following the given offsets.
    async fn commit(&self, offsets: &CycleOffsets) -> Result<(), IngestError>;

    /// Move the read position back so the given offsets are delivered again.
    async fn rewind(&self, offsets: &CycleOffsets) -> Result<(), IngestError>;
}
