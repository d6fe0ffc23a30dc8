//! Automation-session payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::offset_timestamp;

/// Body for `POST /api/reporting/v1/test-runs/{run}/test-sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTestSessionRequest {
    pub session_id: String,
    pub capabilities: serde_json::Value,
    pub desired_capabilities: serde_json::Value,
    pub test_ids: Vec<u64>,
}

/// Body for the incremental `PUT` that associates newly started tests with a
/// session that is still open.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTestSessionRequest {
    pub test_ids: Vec<u64>,
}

/// Body for `PUT /api/reporting/v1/test-runs/{run}/test-sessions/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishTestSessionRequest {
    pub ended_at: DateTime<Utc>,
    pub test_ids: Vec<u64>,
}

impl FinishTestSessionRequest {
    pub fn new(test_ids: Vec<u64>) -> Self {
        Self { ended_at: offset_timestamp(), test_ids }
    }
}
