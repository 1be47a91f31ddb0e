//! Destination index initialization.

use std::sync::Arc;
use tracing::{info, instrument};

use event_indexer_repository::{SearchIndexError, SearchIndexProvider};

/// Ensures the destination index exists before ingestion starts.
///
/// Idempotent, so it runs on every process start.
pub struct IndexInitializer {
    provider: Arc<dyn SearchIndexProvider>,
}

impl IndexInitializer {
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self { provider }
    }

    /// Create the index with default settings unless it already exists.
    #[instrument(skip(self))]
    pub async fn ensure_index(&self, index: &str) -> Result<(), SearchIndexError> {
        if self.provider.index_exists(index).await? {
            info!(index = %index, "Index already exists");
            return Ok(());
        }

        self.provider.create_index(index).await?;
        info!(index = %index, "Index created successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use event_indexer_repository::BulkIndexSummary;
    use event_indexer_shared::IndexDocument;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct MockSearchProvider {
        indices: Mutex<HashSet<String>>,
        create_calls: Mutex<usize>,
        fail_create: bool,
    }

    impl MockSearchProvider {
        fn new(existing: &[&str]) -> Self {
            Self {
                indices: Mutex::new(existing.iter().map(|s| s.to_string()).collect()),
                create_calls: Mutex::new(0),
                fail_create: false,
            }
        }
    }

    #[async_trait]
    impl SearchIndexProvider for MockSearchProvider {
        async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
            Ok(self.indices.lock().unwrap().contains(index))
        }

        async fn create_index(&self, index: &str) -> Result<(), SearchIndexError> {
            *self.create_calls.lock().unwrap() += 1;
            if self.fail_create {
                return Err(SearchIndexError::index_creation("cluster read-only"));
            }
            self.indices.lock().unwrap().insert(index.to_string());
            Ok(())
        }

        async fn bulk_index(
            &self,
            _index: &str,
            _documents: &[IndexDocument],
        ) -> Result<BulkIndexSummary, SearchIndexError> {
            Ok(BulkIndexSummary::default())
        }
    }

    #[tokio::test]
    async fn test_creates_missing_index() {
        let provider = Arc::new(MockSearchProvider::new(&[]));
        let initializer = IndexInitializer::new(provider.clone());

        initializer.ensure_index("wikimedia").await.unwrap();

        assert!(provider.indices.lock().unwrap().contains("wikimedia"));
        assert_eq!(*provider.create_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_existing_index_is_left_alone() {
        let provider = Arc::new(MockSearchProvider::new(&["wikimedia"]));
        let initializer = IndexInitializer::new(provider.clone());

        initializer.ensure_index("wikimedia").await.unwrap();
        initializer.ensure_index("wikimedia").await.unwrap();

        assert_eq!(*provider.create_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_creation_failure_is_reported() {
        let mut provider = MockSearchProvider::new(&[]);
        provider.fail_create = true;
        let initializer = IndexInitializer::new(Arc::new(provider));

        let result = initializer.ensure_index("wikimedia").await;
        assert!(matches!(result, Err(SearchIndexError::IndexCreationError(_))));
    }
}
