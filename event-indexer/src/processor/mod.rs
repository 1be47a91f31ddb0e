//! Processor module for the event indexer ingest.
//!
//! Turns the events of one poll into a batch of documents.

mod event_processor;
mod id_extractor;

pub use event_processor::{Batch, EventProcessor};
pub use id_extractor::{extract_id, extract_id_from_value, ID_FIELD_PATH};
