//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;
use event_indexer_shared::IndexDocument;

use crate::errors::SearchIndexError;
use crate::types::BulkIndexSummary;

/// Abstracts the underlying search index implementation (OpenSearch, Elasticsearch, etc.).
///
/// Implementations are shared between the index initializer and the loader,
/// and are mocked in tests.
///
/// # Note on Document Identity
///
/// There is no separate `create_document` function. `bulk_index` issues an index
/// (create-or-replace) operation keyed by `IndexDocument::id`, so writing the same
/// document twice leaves exactly one document in the index.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Check whether the named index exists.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The index exists
    /// * `Ok(false)` - The index does not exist
    /// * `Err(SearchIndexError)` - If the check itself fails
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError>;

    /// Create the named index with the provider's default settings.
    ///
    /// An index created concurrently by another process between the existence
    /// check and this call is not an error.
    async fn create_index(&self, index: &str) -> Result<(), SearchIndexError>;

    /// Write all documents to the index in one bulk request.
    ///
    /// # Arguments
    ///
    /// * `index` - The destination index
    /// * `documents` - The documents to write, each keyed by its id
    ///
    /// # Returns
    ///
    /// * `Ok(BulkIndexSummary)` - The request was accepted; per-item outcomes are in the summary
    /// * `Err(SearchIndexError)` - If the bulk request failed entirely
    async fn bulk_index(
        &self,
        index: &str,
        documents: &[IndexDocument],
    ) -> Result<BulkIndexSummary, SearchIndexError>;
}
