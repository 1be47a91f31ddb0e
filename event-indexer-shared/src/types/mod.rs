//! This module defines the core data structures used across the event indexer.
//! It re-exports specific types like `IndexDocument`.

pub mod index_document;

pub use index_document::IndexDocument;
