//! Error types for the event indexer ingest.

use thiserror::Error;

/// Errors that can occur in the ingestion loop.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Error from the loader component (the bulk write failed as a whole).
    #[error("Loader error: {0}")]
    LoaderError(String),

    /// Kafka-related error.
    #[error("Kafka error: {0}")]
    KafkaError(String),
}

impl IngestError {
    /// Create a loader error.
    pub fn loader(msg: impl Into<String>) -> Self {
        Self::LoaderError(msg.into())
    }

    /// Create a Kafka error.
    pub fn kafka(msg: impl Into<String>) -> Self {
        Self::KafkaError(msg.into())
    }
}

impl From<rdkafka::error::KafkaError> for IngestError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        Self::KafkaError(err.to_string())
    }
}

/// Why a single event could not be turned into a document.
///
/// Recoverable: the event is skipped and the rest of its batch is still written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedPayload {
    /// The event carried no value.
    #[error("event has no payload")]
    MissingPayload,

    /// The value is not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),

    /// The value is JSON but not an object.
    #[error("payload is not a JSON object")]
    NotAnObject,

    /// The identity field is absent.
    #[error("payload has no '{0}' field")]
    MissingField(&'static str),

    /// The identity field is present but unusable as a document id.
    #[error("invalid document id: {0}")]
    InvalidId(String),
}
