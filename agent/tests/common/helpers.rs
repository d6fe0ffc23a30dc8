//! Wiremock stubs shared by the agent test suites

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// First value of a header on a recorded request, if present.
pub fn header_value(request: &wiremock::Request, name: &str) -> Option<String> {
    request
        .headers
        .iter()
        .find(|(key, _)| key.as_str().eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.iter().next().map(|value| value.to_string()))
}

/// Stub the token exchange; every suite needs it first.
pub async fn mount_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/iam/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"authToken": "bearer-xyz"})))
        .mount(server)
        .await;
}

/// Stub a successful start-run call returning the given remote id.
pub async fn mount_start_run(server: &MockServer, run_id: u64) {
    Mock::given(method("POST"))
        .and(path("/api/reporting/v1/test-runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": run_id})))
        .mount(server)
        .await;
}

/// Stub a successful start-test call returning the given remote id.
pub async fn mount_start_test(server: &MockServer, run_id: u64, test_id: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/api/reporting/v1/test-runs/{run_id}/tests")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": test_id})))
        .mount(server)
        .await;
}
