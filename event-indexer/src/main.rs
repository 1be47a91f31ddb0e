//! Event Indexer Main Entry Point
//!
//! Consumes events from Kafka and indexes them into OpenSearch until the
//! process receives SIGINT or SIGTERM.

use dotenv::dotenv;
use event_indexer::{Dependencies, IndexerConfig, IndexingError, ShutdownController};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), IndexingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("event_indexer=info,event_indexer_repository=info"));

    let json_output = env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
            .map_err(|e| IndexingError::config(format!("Failed to initialize tracing: {}", e)))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .map_err(|e| IndexingError::config(format!("Failed to initialize tracing: {}", e)))?;
    }

    info!(
        service_name = "event-indexer",
        service_version = env!("CARGO_PKG_VERSION"),
        json_output = json_output,
        "Tracing initialized"
    );

    Ok(())
}

async fn run() -> Result<(), IndexingError> {
    let config = IndexerConfig::from_env()?;

    let shutdown = ShutdownController::new();
    shutdown.register_signal_handlers();

    let deps = match Dependencies::new(&config, shutdown.token()).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match deps.orchestrator.run().await {
        Ok(stats) => {
            info!(
                documents_indexed = stats.documents_indexed,
                events_skipped = stats.events_skipped,
                "Event indexer stopped"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Event indexer failed");
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    info!("Starting event indexer");

    let result = run().await;

    info!("Application has exited");
    result
}
