//! Search index error types.
//!
//! This module defines the unified error type for all search index operations,
//! from parsing the connection URI to the bulk write itself.

use thiserror::Error;

/// Unified errors from search index operations.
///
/// Used by the `SearchIndexProvider` trait and its implementations. A
/// `BulkIndexError` means the whole bulk request failed (transport error or
/// non-success status); failures of single items inside a successful bulk
/// response are reported through `BulkIndexSummary` instead.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// The document store connection URI could not be parsed.
    #[error("Invalid connection URI: {0}")]
    InvalidUri(String),

    /// Failed to establish connection to the search index backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to check for or create the search index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// The bulk request failed as a whole.
    #[error("Bulk index error: {0}")]
    BulkIndexError(String),

    /// A single item inside a bulk response was rejected.
    #[error("Item error: {0}")]
    ItemError(String),

    /// Failed to parse response from search index backend.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl SearchIndexError {
    /// Create an invalid URI error.
    pub fn invalid_uri(msg: impl Into<String>) -> Self {
        Self::InvalidUri(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a bulk index error.
    pub fn bulk_index(msg: impl Into<String>) -> Self {
        Self::BulkIndexError(msg.into())
    }

    /// Create an item error.
    pub fn item(msg: impl Into<String>) -> Self {
        Self::ItemError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}
