//! Enums shared between the agent core and host integrations

use serde::{Deserialize, Serialize};

/// Result value accepted by the reporting service for a finished test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStatus {
    Unknown,
    InProgress,
    Passed,
    Failed,
    Skipped,
    Aborted,
    Queued,
}

impl TestStatus {
    /// Wire representation, as sent in `result` fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Unknown => "UNKNOWN",
            TestStatus::InProgress => "IN_PROGRESS",
            TestStatus::Passed => "PASSED",
            TestStatus::Failed => "FAILED",
            TestStatus::Skipped => "SKIPPED",
            TestStatus::Aborted => "ABORTED",
            TestStatus::Queued => "QUEUED",
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
