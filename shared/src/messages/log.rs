//! Batched log record payload

use serde::{Deserialize, Serialize};

/// One buffered log record, as posted to
/// `POST /api/reporting/v1/test-runs/{run}/logs` in batches.
///
/// The service takes the test id and millisecond timestamp as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub test_id: String,
    pub level: String,
    pub timestamp: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(test_id: u64, level: impl Into<String>, timestamp_ms: i64, message: impl Into<String>) -> Self {
        Self {
            test_id: test_id.to_string(),
            level: level.into(),
            timestamp: timestamp_ms.to_string(),
            message: message.into(),
        }
    }
}
