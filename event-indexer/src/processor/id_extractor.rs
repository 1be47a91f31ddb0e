//! Document identity extraction.
//!
//! Producers publish JSON objects with a top-level `meta` object whose `id`
//! field identifies the event. That id becomes the document id, so the same
//! event always lands on the same document.

use serde_json::Value;

use crate::errors::MalformedPayload;

/// Path of the identity field inside the payload.
pub const ID_FIELD_PATH: &str = "meta.id";

/// Extract the document id from a raw payload.
///
/// # Example
///
/// ```
/// use event_indexer::processor::extract_id;
///
/// let id = extract_id(r#"{"meta": {"id": "a1b2"}, "title": "Main Page"}"#).unwrap();
/// assert_eq!(id, "a1b2");
/// ```
pub fn extract_id(payload: &str) -> Result<String, MalformedPayload> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| MalformedPayload::InvalidJson(e.to_string()))?;
    extract_id_from_value(&value)
}

/// Extract the document id from an already parsed payload.
///
/// String ids are used as-is; numeric and boolean ids use their JSON rendering.
pub fn extract_id_from_value(value: &Value) -> Result<String, MalformedPayload> {
    let object = value.as_object().ok_or(MalformedPayload::NotAnObject)?;

    let id = object
        .get("meta")
        .and_then(|meta| meta.get("id"))
        .ok_or(MalformedPayload::MissingField(ID_FIELD_PATH))?;

    match id {
        Value::String(s) if s.is_empty() => Err(MalformedPayload::InvalidId("empty id".to_string())),
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Err(MalformedPayload::InvalidId("id is null".to_string())),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Array(_) | Value::Object(_) => Err(MalformedPayload::InvalidId(
            "id is not a scalar".to_string(),
        )),
    }
}
