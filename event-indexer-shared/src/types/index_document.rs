//! Document type written to the search index.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// A single document destined for the search index.
///
/// The `id` is derived deterministically from the event payload, so indexing the
/// same event twice overwrites the existing document instead of creating a
/// second one. The `body` is the event payload exactly as it was received: it
/// is held as raw JSON and serializes back to the same text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDocument {
    pub id: String,
    pub body: Box<RawValue>,
}

impl IndexDocument {
    /// Create a new document from an already validated raw body.
    pub fn new(id: impl Into<String>, body: Box<RawValue>) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }

    /// Create a new document from a JSON payload, keeping its text unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use event_indexer_shared::IndexDocument;
    ///
    /// let doc = IndexDocument::from_payload("abc", r#"{"meta":{"id":"abc"}}"#).unwrap();
    /// assert_eq!(doc.id, "abc");
    /// assert_eq!(doc.body_json(), r#"{"meta":{"id":"abc"}}"#);
    /// ```
    pub fn from_payload(
        id: impl Into<String>,
        payload: impl Into<String>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(id, RawValue::from_string(payload.into())?))
    }

    /// The body as JSON text.
    pub fn body_json(&self) -> &str {
        self.body.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_document_from_payload() {
        let doc = IndexDocument::from_payload("evt-1", r#"{"meta":{"id":"evt-1"},"title":"Main Page"}"#)
            .unwrap();

        assert_eq!(doc.id, "evt-1");
        assert_eq!(doc.body_json(), r#"{"meta":{"id":"evt-1"},"title":"Main Page"}"#);
    }

    #[test]
    fn test_body_serializes_verbatim() {
        // Key order, number precision and formatting all survive
        let payload = r#"{"meta":{"id":"a"},"zeta":1,"alpha":12345678901234567890123,"rev":1.50}"#;
        let doc = IndexDocument::from_payload("a", payload).unwrap();

        assert_eq!(serde_json::to_string(&doc.body).unwrap(), payload);
    }

    #[test]
    fn test_invalid_payload_is_rejected() {
        assert!(IndexDocument::from_payload("a", "{not json").is_err());
    }
}
