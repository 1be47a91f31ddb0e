//! Event processor implementation.
//!
//! Transforms the events of one poll cycle into a batch of documents.

use event_indexer_shared::IndexDocument;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::consumer::{CycleOffsets, Event};
use crate::errors::MalformedPayload;
use crate::processor::id_extractor::extract_id_from_value;

/// Documents built from exactly one poll cycle.
#[derive(Debug, Default)]
pub struct Batch {
    /// Documents in event arrival order.
    pub documents: Vec<IndexDocument>,
    /// Number of events skipped because their payload was malformed.
    pub skipped: usize,
    /// Offsets of every event of the cycle, skipped ones included.
    pub offsets: CycleOffsets,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }
}

/// Processor that transforms events into documents.
///
/// A malformed event is logged and skipped; it never prevents the other
/// events of its cycle from being indexed.
#[derive(Debug, Default)]
pub struct EventProcessor {}

impl EventProcessor {
    /// Create a new event processor.
    pub fn new() -> Self {
        Self {}
    }

    /// Build the batch for one poll cycle.
    #[instrument(skip(self, events), fields(event_count = events.len()))]
    pub fn build_batch(&self, events: &[Event]) -> Batch {
        let mut documents = Vec::with_capacity(events.len());
        let mut skipped = 0;

        for event in events {
            match self.process_event(event) {
                Ok(doc) => {
                    debug!(id = %doc.id, partition = event.partition, offset = event.offset, "Extracted document id");
                    documents.push(doc);
                }
                Err(reason) => {
                    skipped += 1;
                    warn!(
                        topic = %event.topic,
                        partition = event.partition,
                        offset = event.offset,
                        reason = %reason,
                        "Skipping event due to malformed payload"
                    );
                    debug!(payload = ?event.payload, "Skipped payload");
                }
            }
        }

        Batch {
            documents,
            skipped,
            offsets: CycleOffsets::from_events(events),
        }
    }

    /// Process a single event.
    fn process_event(&self, event: &Event) -> Result<IndexDocument, MalformedPayload> {
        let payload = event
            .payload
            .as_deref()
            .ok_or(MalformedPayload::MissingPayload)?;

        // Parsed only to read the id; the document keeps the payload text
        let parsed: Value = serde_json::from_str(payload)
            .map_err(|e| MalformedPayload::InvalidJson(e.to_string()))?;
        let id = extract_id_from_value(&parsed)?;

        IndexDocument::from_payload(id, payload)
            .map_err(|e| MalformedPayload::InvalidJson(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(offset: i64, payload: Option<&str>) -> Event {
        Event::new("wikimedia.recentchange", 0, offset, payload.map(str::to_string))
    }

    #[test]
    fn test_process_valid_event() {
        let processor = EventProcessor::new();
        let doc = processor
            .process_event(&event(0, Some(r#"{"meta":{"id":"a"},"title":"Main Page"}"#)))
            .unwrap();

        assert_eq!(doc.id, "a");
        assert_eq!(doc.body_json(), r#"{"meta":{"id":"a"},"title":"Main Page"}"#);
    }

    #[test]
    fn test_body_is_the_payload_text() {
        let processor = EventProcessor::new();
        let payload = r#"{"meta":{"id":"a"},"zeta":1,"alpha":12345678901234567890123,"rev":1.50}"#;

        let doc = processor.process_event(&event(0, Some(payload))).unwrap();

        assert_eq!(doc.body_json(), payload);
        assert_eq!(serde_json::to_string(&doc.body).unwrap(), payload);
    }

    #[test]
    fn test_process_event_without_payload() {
        let processor = EventProcessor::new();
        assert!(matches!(
            processor.process_event(&event(0, None)),
            Err(MalformedPayload::MissingPayload)
        ));
    }

    #[test]
    fn test_batch_skips_malformed_events() {
        let processor = EventProcessor::new();
        let events = vec![
            event(7, Some(r#"{"meta":{"id":"a"}}"#)),
            event(8, Some("not json")),
            event(9, Some(r#"{"meta":{"id":"b"}}"#)),
        ];

        let batch = processor.build_batch(&events);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.skipped, 1);
        let ids: Vec<&str> = batch.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        // Skipped events still count towards the cycle's offsets
        let commits: Vec<_> = batch.offsets.commit_positions().collect();
        assert_eq!(commits, vec![("wikimedia.recentchange", 0, 10)]);
    }

    #[test]
    fn test_batch_all_malformed() {
        let processor = EventProcessor::new();
        let batch = processor.build_batch(&[event(0, Some("{}")), event(1, None)]);

        assert!(batch.is_empty());
        assert_eq!(batch.skipped, 2);
        assert!(!batch.offsets.is_empty());
    }

    #[test]
    fn test_same_payload_same_id() {
        let processor = EventProcessor::new();
        let payload = r#"{"meta":{"id":"dup"},"rev":1}"#;
        let batch = processor.build_batch(&[event(0, Some(payload)), event(1, Some(payload))]);

        assert_eq!(batch.documents[0].id, batch.documents[1].id);
    }
}
