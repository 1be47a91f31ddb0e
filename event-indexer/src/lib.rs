//! # Event Indexer
//!
//! Drains a Kafka topic and indexes every event into OpenSearch, advancing
//! consumer offsets only after the corresponding bulk write succeeded.
//!
//! ## Architecture
//!
//! The indexer follows the Consumer-Processor-Loader pattern:
//!
//! 1. **Consumer**: Polls events from Kafka and commits offsets
//! 2. **Processor**: Derives each document's id from its payload and builds the cycle's batch
//! 3. **Loader**: Ensures the index exists and writes each batch in one bulk request
//! 4. **Orchestrator**: Runs the poll, write, commit cycle until shutdown
//!
//! Document ids are taken from the payload's `meta.id` field, so a redelivered
//! event overwrites its document instead of duplicating it.
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`consumer`]: Event source abstraction and Kafka consumer
//! - [`processor`]: Id extraction and batch building
//! - [`loader`]: Index initialization and bulk writes
//! - [`orchestrator`]: The ingestion loop
//! - [`shutdown`]: Cross-task shutdown trigger
//! - [`errors`]: Error types for the indexer

pub mod config;
pub mod consumer;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod shutdown;

pub use config::{Dependencies, IndexerConfig};
pub use errors::{IngestError, MalformedPayload};
pub use orchestrator::{IngestStats, IngestionLoop};
pub use shutdown::ShutdownController;

use event_indexer_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The search index could not be reached or prepared.
    #[error("Search index error: {0}")]
    IndexError(#[from] SearchIndexError),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
