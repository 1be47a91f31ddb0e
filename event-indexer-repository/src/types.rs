//! Response types for search index operations.

use crate::errors::SearchIndexError;

/// Result of a bulk write for a single document.
#[derive(Debug, Clone)]
pub struct BulkItemResult {
    /// The document id the item was written under.
    pub id: String,
    /// HTTP status reported for the item, if any.
    pub status: Option<u16>,
    /// Whether the item was written.
    pub success: bool,
    /// Error if the item was rejected.
    pub error: Option<SearchIndexError>,
}

/// Summary of a bulk write containing aggregate statistics and individual results.
///
/// Per-item failures are reported here and are not retried: the bulk request as
/// a whole succeeded, so the caller treats the cycle as written.
#[derive(Debug, Clone, Default)]
pub struct BulkIndexSummary {
    /// Total number of documents in the request.
    pub total: usize,
    /// Number of documents written.
    pub succeeded: usize,
    /// Number of documents rejected.
    pub failed: usize,
    /// Individual results for each document.
    pub results: Vec<BulkItemResult>,
}

impl BulkIndexSummary {
    /// Build a summary from individual item results.
    pub fn from_results(results: Vec<BulkItemResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Iterate over the rejected items.
    pub fn failures(&self) -> impl Iterator<Item = &BulkItemResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, success: bool) -> BulkItemResult {
        BulkItemResult {
            id: id.to_string(),
            status: Some(if success { 201 } else { 400 }),
            success,
            error: (!success).then(|| SearchIndexError::item("mapper_parsing_exception")),
        }
    }

    #[test]
    fn test_summary_counts() {
        let summary =
            BulkIndexSummary::from_results(vec![item("a", true), item("b", false), item("c", true)]);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        let failed: Vec<&str> = summary.failures().map(|r| r.id.as_str()).collect();
        assert_eq!(failed, vec!["b"]);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BulkIndexSummary::from_results(Vec::new());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.failed, 0);
    }
}
