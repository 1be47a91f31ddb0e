//! Configuration and dependency wiring for the event indexer.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{IndexerConfig, IngestSettings, KafkaSettings, OpenSearchSettings, SaslCredentials};
