//! Loader module for the event indexer ingest.
//!
//! Writes one batch per cycle into the search index and makes sure the index
//! exists before ingestion starts.

mod index_initializer;

pub use index_initializer::IndexInitializer;

use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

use crate::errors::IngestError;
use crate::processor::Batch;
use event_indexer_repository::{BulkIndexSummary, SearchIndexProvider};

/// Loader that indexes documents into the search engine.
///
/// Each call to `write_batch` is exactly one bulk request; the loader keeps no
/// pending state between cycles.
pub struct SearchLoader {
    provider: Arc<dyn SearchIndexProvider>,
    index_name: String,
}

impl SearchLoader {
    /// Create a new search loader writing into `index_name`.
    pub fn new(provider: Arc<dyn SearchIndexProvider>, index_name: impl Into<String>) -> Self {
        Self {
            provider,
            index_name: index_name.into(),
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Write a batch in one bulk request.
    ///
    /// Returns an error only if the request failed as a whole. Items rejected
    /// inside a successful response are logged and counted in the summary but
    /// not retried.
    #[instrument(skip(self, batch), fields(document_count = batch.len()))]
    pub async fn write_batch(&self, batch: &Batch) -> Result<BulkIndexSummary, IngestError> {
        if batch.is_empty() {
            return Ok(BulkIndexSummary::default());
        }

        let count = batch.len();
        debug!(count = count, index = %self.index_name, "Writing batch to search index");

        match self
            .provider
            .bulk_index(&self.index_name, &batch.documents)
            .await
        {
            Ok(summary) => {
                if summary.failed > 0 {
                    warn!(
                        succeeded = summary.succeeded,
                        failed = summary.failed,
                        "Bulk write completed with some failures"
                    );
                    for result in summary.failures() {
                        error!(
                            id = %result.id,
                            status = ?result.status,
                            error = ?result.error,
                            "Failed to index document"
                        );
                    }
                }
                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, count = count, "Failed to execute bulk request");
                Err(IngestError::loader(format!(
                    "Failed to bulk index {} documents: {}",
                    count, e
                )))
            }
        }
    }
}
