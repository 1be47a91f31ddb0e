//! # Event Indexer Shared
//!
//! This crate defines the data structures shared across the event indexer crates.
//! It includes the document type handed from the ingestion loop to the store adapter.

pub mod types;

pub use types::index_document::IndexDocument;
