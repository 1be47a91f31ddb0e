//! # Event Indexer Repository
//!
//! This crate provides traits and implementations for writing to the search
//! index. It includes definitions for errors, the provider interface, the
//! connection URI parser, and a concrete implementation for OpenSearch.

pub mod connection;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use connection::{BasicCredentials, StoreConnection};
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::{IndexSettings, OpenSearchProvider};
pub use types::{BulkIndexSummary, BulkItemResult};
