//! Wire-contract tests for the real API client
//!
//! Each test pins one aspect of the REST contract: paths, methods, auth
//! headers, camelCase bodies, and the failure contract.

mod common;

use std::io::Write;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use agent::error::AgentError;
use agent::services::api_client::RealReportingApi;
use agent::traits::ReportingApi;
use shared::messages::{LabelPayload, LogEntry, StartTestRequest, StartTestRunRequest};
use shared::types::TestStatus;

use common::{header_value, mount_auth};

#[tokio::test]
async fn test_start_run_sends_project_key_and_bearer_token() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/reporting/v1/test-runs"))
        .and(query_param("projectKey", "ACME"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let api = RealReportingApi::new(&server.uri(), "access-token");
    api.auth().await.unwrap();

    let run_id = api
        .start_test_run("ACME", StartTestRunRequest::new("nightly", "rust"))
        .await
        .unwrap();
    assert_eq!(run_id, 42);

    let requests = server.received_requests().await.unwrap();
    let start_run = requests
        .iter()
        .find(|r| r.url.path() == "/api/reporting/v1/test-runs")
        .unwrap();

    assert_eq!(
        header_value(start_run, "authorization").as_deref(),
        Some("Bearer bearer-xyz")
    );

    let body: serde_json::Value = serde_json::from_slice(&start_run.body).unwrap();
    assert_eq!(body["name"], "nightly");
    assert!(body.get("startedAt").is_some());
    // Optional blocks that were not set must be omitted, not null.
    assert!(body.get("milestone").is_none());
}

#[tokio::test]
async fn test_auth_failure_leaves_client_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/iam/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/reporting/v1/test-runs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .mount(&server)
        .await;

    let api = RealReportingApi::new(&server.uri(), "expired");
    let result = api.auth().await;
    assert!(matches!(result, Err(AgentError::Http { status: 401, .. })));

    // Later calls go out unsigned rather than panicking.
    api.start_test_run("ACME", StartTestRunRequest::new("run", "rust"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let start_run = requests
        .iter()
        .find(|r| r.url.path() == "/api/reporting/v1/test-runs")
        .unwrap();
    assert!(header_value(start_run, "authorization").is_none());
}

#[tokio::test]
async fn test_non_success_status_maps_to_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reporting/v1/test-runs/7/tests"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let api = RealReportingApi::new(&server.uri(), "token");
    let result = api
        .start_test(7, StartTestRequest::new("t", "tests/t.rs", "t"))
        .await;

    match result {
        Err(AgentError::Http { status, body, .. }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected http error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_maps_to_transport_error() {
    // Nothing listens on the discard port.
    let api = RealReportingApi::new("http://127.0.0.1:9", "token");
    let result = api.finish_test_run(1).await;
    assert!(matches!(result, Err(AgentError::Transport { .. })));
}

#[tokio::test]
async fn test_finish_run_timestamp_lags_behind_now() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/reporting/v1/test-runs/7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = RealReportingApi::new(&server.uri(), "token");
    api.finish_test_run(7).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let ended_at: chrono::DateTime<chrono::Utc> =
        body["endedAt"].as_str().unwrap().parse().unwrap();
    assert!(ended_at < chrono::Utc::now());
}

#[tokio::test]
async fn test_labels_ship_as_put_with_items_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/reporting/v1/test-runs/7/tests/9/labels"))
        .and(body_json(json!({"items": [{"key": "priority", "value": "high"}]})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = RealReportingApi::new(&server.uri(), "token");
    api.send_labels(7, Some(9), vec![LabelPayload::new("priority", "high")])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_run_scoped_labels_omit_the_test_segment() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/reporting/v1/test-runs/7/labels"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = RealReportingApi::new(&server.uri(), "token");
    api.send_labels(7, None, vec![LabelPayload::new("k", "v")])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_logs_post_as_bare_array() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reporting/v1/test-runs/7/logs"))
        .and(body_json(json!([
            {"testId": "9", "level": "INFO", "timestamp": "1700000000000", "message": "hello"}
        ])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = RealReportingApi::new(&server.uri(), "token");
    api.send_logs(7, vec![LogEntry::new(9, "INFO", 1700000000000, "hello")])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_artifact_uploads_as_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reporting/v1/test-runs/7/tests/9/artifacts"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"trace output").unwrap();

    let api = RealReportingApi::new(&server.uri(), "token");
    api.send_artifact(7, Some(9), file.path()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let content_type = header_value(&requests[0], "content-type").unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
}

#[tokio::test]
async fn test_screenshot_posts_png_bytes_with_capture_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reporting/v1/test-runs/7/tests/9/screenshots"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"\x89PNG\r\n").unwrap();

    let api = RealReportingApi::new(&server.uri(), "token");
    api.send_screenshot(7, 9, file.path()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    assert_eq!(request.body, b"\x89PNG\r\n");
    assert!(header_value(request, "x-reportal-screenshot-captured-at").is_some());
}

#[tokio::test]
async fn test_rerun_exchange_posts_opaque_context() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reporting/v1/run-context-exchanges"))
        .and(body_json(json!({"testRunUuid": "u-1", "mode": "RERUN"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "testRunUuid": "u-1",
            "runAllowed": true,
            "runOnlySpecificTests": true,
            "testsToRun": [
                {"id": 11, "name": "test_a", "correlationData": "{\"name\":\"test_a\"}"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = RealReportingApi::new(&server.uri(), "token");
    let rerun = api
        .get_rerun_tests(r#"{"testRunUuid": "u-1", "mode": "RERUN"}"#)
        .await
        .unwrap();

    assert!(rerun.run_allowed);
    assert!(rerun.run_only_specific_tests);
    assert_eq!(rerun.tests_to_run.len(), 1);
    assert_eq!(rerun.tests_to_run[0].name, "test_a");
}

#[tokio::test]
async fn test_finish_test_serializes_status_enum() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/reporting/v1/test-runs/7/tests/9"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = RealReportingApi::new(&server.uri(), "token");
    api.finish_test(
        7,
        9,
        shared::messages::FinishTestRequest::new(TestStatus::Skipped, Some("flaky".into())),
    )
    .await
    .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["result"], "SKIPPED");
    assert_eq!(body["reason"], "flaky");
}
