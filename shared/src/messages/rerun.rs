//! Run-context exchange payloads

use serde::{Deserialize, Serialize};

fn default_run_allowed() -> bool {
    true
}

/// One remote test the service wants re-executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerunTest {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_data: Option<String>,
}

/// Decision payload returned by
/// `POST /api/reporting/v1/run-context-exchanges`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerunContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_run_uuid: Option<String>,
    #[serde(default = "default_run_allowed")]
    pub run_allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub run_only_specific_tests: bool,
    #[serde(default)]
    pub tests_to_run: Vec<RerunTest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rerun_context_defaults_to_allowed() {
        let parsed: RerunContext = serde_json::from_str("{}").unwrap();
        assert!(parsed.run_allowed);
        assert!(!parsed.run_only_specific_tests);
        assert!(parsed.tests_to_run.is_empty());
    }

    #[test]
    fn test_rerun_context_parses_tests_to_run() {
        let raw = r#"{
            "testRunUuid": "u-1",
            "runAllowed": false,
            "reason": "budget exceeded",
            "runOnlySpecificTests": true,
            "testsToRun": [{"id": 9, "name": "test_a", "correlationData": "{\"name\":\"test_a\"}"}]
        }"#;
        let parsed: RerunContext = serde_json::from_str(raw).unwrap();

        assert!(!parsed.run_allowed);
        assert_eq!(parsed.reason.as_deref(), Some("budget exceeded"));
        assert_eq!(parsed.tests_to_run[0].id, 9);
        assert_eq!(parsed.tests_to_run[0].name, "test_a");
    }
}
