//! OpenSearch index settings.
//!
//! The destination index is created with the cluster's default settings unless
//! shard or replica counts are configured explicitly. No mappings are sent, so
//! field types are inferred from the first documents written.

use serde_json::{json, Map, Value};

/// Settings applied when the destination index has to be created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSettings {
    /// Number of primary shards, or `None` for the cluster default.
    pub number_of_shards: Option<u32>,
    /// Number of replicas, or `None` for the cluster default.
    pub number_of_replicas: Option<u32>,
}

impl IndexSettings {
    /// Create settings with explicit shard and replica counts.
    pub fn new(number_of_shards: Option<u32>, number_of_replicas: Option<u32>) -> Self {
        Self {
            number_of_shards,
            number_of_replicas,
        }
    }

    /// Render the body of the create-index request.
    ///
    /// Returns an empty object when nothing is configured.
    pub fn to_body(&self) -> Value {
        let mut settings = Map::new();
        if let Some(shards) = self.number_of_shards {
            settings.insert("number_of_shards".to_string(), json!(shards));
        }
        if let Some(replicas) = self.number_of_replicas {
            settings.insert("number_of_replicas".to_string(), json!(replicas));
        }

        if settings.is_empty() {
            json!({})
        } else {
            json!({ "settings": settings })
        }
    }
}
