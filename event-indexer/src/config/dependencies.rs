//! Dependency initialization and wiring for the event indexer.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::IndexerConfig;
use crate::consumer::{EventSource, KafkaEventSource};
use crate::loader::{IndexInitializer, SearchLoader};
use crate::orchestrator::IngestionLoop;
use crate::processor::EventProcessor;
use crate::IndexingError;
use event_indexer_repository::{OpenSearchProvider, SearchIndexProvider, StoreConnection};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured ingestion loop, owning both clients.
    pub orchestrator: IngestionLoop,
}

impl Dependencies {
    /// Build both clients from the configuration and prepare the index.
    ///
    /// Fails fast on an unusable store URI, a consumer that cannot be created,
    /// or an index that cannot be created. Clients built before the failure
    /// are dropped on the way out.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If initialization fails
    pub async fn new(
        config: &IndexerConfig,
        shutdown: CancellationToken,
    ) -> Result<Self, IndexingError> {
        info!(
            kafka_broker = %config.kafka.brokers,
            kafka_group_id = %config.kafka.group_id,
            kafka_topic = %config.kafka.topic,
            index_name = %config.opensearch.index_name,
            "Initializing dependencies"
        );

        let connection = StoreConnection::parse(&config.opensearch.url)?;
        let provider = OpenSearchProvider::new(
            &connection,
            config.opensearch.index_settings.clone(),
            config.opensearch.request_timeout,
        )?;

        info!("OpenSearch client created");

        let consumer = KafkaEventSource::new(&config.kafka).map_err(|e| {
            IndexingError::config(format!("Failed to create Kafka consumer: {}", e))
        })?;

        Self::with_components(config, Arc::new(provider), Box::new(consumer), shutdown).await
    }

    /// Wire already constructed clients into an ingestion loop.
    ///
    /// Ensures the destination index exists first; a failure here is fatal.
    pub async fn with_components(
        config: &IndexerConfig,
        provider: Arc<dyn SearchIndexProvider>,
        source: Box<dyn EventSource>,
        shutdown: CancellationToken,
    ) -> Result<Self, IndexingError> {
        IndexInitializer::new(provider.clone())
            .ensure_index(&config.opensearch.index_name)
            .await?;

        let loader = SearchLoader::new(provider, config.opensearch.index_name.clone());
        let orchestrator = IngestionLoop::new(
            source,
            EventProcessor::new(),
            loader,
            config.ingest.clone(),
            shutdown,
        );

        Ok(Self { orchestrator })
    }
}
