//! Tests for the SessionManager service

use std::sync::Arc;

use serde_json::json;

use crate::error::AgentError;
use crate::services::session_manager::SessionManager;
use crate::state::RunContext;
use crate::traits::MockReportingApi;
use crate::types::Test;

fn active_run_context(run_id: u64) -> Arc<RunContext> {
    let context = RunContext::new();
    context.adopt_run(run_id, "run under test");
    context
}

fn activate_test(context: &RunContext, test_id: u64) {
    context.set_test(Test::new("test", "tests/file.rs", vec![], vec![]));
    context.assign_test_id(test_id);
}

#[tokio::test]
async fn test_session_accumulates_tests_in_start_order() {
    let context = active_run_context(10);
    let mut api = MockReportingApi::new();

    api.expect_start_test_session()
        .withf(|run_id, body| *run_id == 10 && body.test_ids.is_empty())
        .times(1)
        .returning(|_, _| Ok("remote-1".to_string()));
    api.expect_add_tests_to_session()
        .withf(|_, session_id, ids| session_id == "remote-1" && ids == &[1])
        .times(1)
        .returning(|_, _, _| Ok(()));
    api.expect_add_tests_to_session()
        .withf(|_, session_id, ids| session_id == "remote-1" && ids == &[2])
        .times(1)
        .returning(|_, _, _| Ok(()));
    api.expect_finish_test_session()
        .withf(|run_id, session_id, body| {
            *run_id == 10 && session_id == "remote-1" && body.test_ids == vec![1, 2]
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let manager = SessionManager::new(Arc::new(api), Arc::clone(&context));

    manager.start_session("local-1", json!({}), json!({})).await;

    activate_test(&context, 1);
    manager.add_test(1).await;
    context.clear_test();

    activate_test(&context, 2);
    manager.add_test(2).await;
    context.clear_test();

    manager.finish_session("local-1").await.unwrap();
    assert_eq!(manager.open_sessions(), 0);
}

#[tokio::test]
async fn test_active_test_seeds_new_session() {
    let context = active_run_context(10);
    activate_test(&context, 7);

    let mut api = MockReportingApi::new();
    api.expect_start_test_session()
        .withf(|_, body| body.test_ids == vec![7])
        .times(1)
        .returning(|_, _| Ok("remote-7".to_string()));
    api.expect_finish_test_session()
        .withf(|_, _, body| body.test_ids == vec![7])
        .times(1)
        .returning(|_, _, _| Ok(()));

    let manager = SessionManager::new(Arc::new(api), Arc::clone(&context));
    manager.start_session("local-7", json!({"browserName": "chrome"}), json!({})).await;
    manager.finish_session("local-7").await.unwrap();
}

#[tokio::test]
async fn test_finishing_unknown_session_fails_loudly() {
    let context = active_run_context(10);
    let manager = SessionManager::new(Arc::new(MockReportingApi::new()), context);

    let result = manager.finish_session("never-started").await;
    assert!(matches!(
        result,
        Err(AgentError::UnknownSession { session_id }) if session_id == "never-started"
    ));
}

#[tokio::test]
async fn test_inactive_run_keeps_session_local_only() {
    // No expectations on the mock: any API call would panic the test.
    let context = RunContext::new();
    let manager = SessionManager::new(Arc::new(MockReportingApi::new()), context);

    manager.start_session("local-1", json!({}), json!({})).await;
    assert_eq!(manager.open_sessions(), 1);

    manager.add_test(3).await;
    manager.finish_session("local-1").await.unwrap();
    assert_eq!(manager.open_sessions(), 0);
}

#[tokio::test]
async fn test_finish_all_sessions_drains_every_record() {
    let context = active_run_context(10);
    let mut api = MockReportingApi::new();

    api.expect_start_test_session()
        .withf(|_, body| body.session_id == "local-a")
        .times(1)
        .returning(|_, _| Ok("remote-a".to_string()));
    api.expect_start_test_session()
        .withf(|_, body| body.session_id == "local-b")
        .times(1)
        .returning(|_, _| Ok("remote-b".to_string()));
    api.expect_finish_test_session()
        .times(2)
        .returning(|_, _, _| Ok(()));

    let manager = SessionManager::new(Arc::new(api), context);
    manager.start_session("local-a", json!({}), json!({})).await;
    manager.start_session("local-b", json!({}), json!({})).await;
    assert_eq!(manager.open_sessions(), 2);

    manager.finish_all_sessions().await;
    assert_eq!(manager.open_sessions(), 0);
}

#[tokio::test]
async fn test_failed_remote_registration_is_tolerated() {
    let context = active_run_context(10);
    let mut api = MockReportingApi::new();

    api.expect_start_test_session().times(1).returning(|_, _| {
        Err(AgentError::Http {
            method: "POST".into(),
            url: "http://reportal/test-sessions".into(),
            status: 503,
            body: "unavailable".into(),
        })
    });
    // No remote id was assigned, so finishing must not call the service.

    let manager = SessionManager::new(Arc::new(api), context);
    manager.start_session("local-1", json!({}), json!({})).await;
    assert_eq!(manager.open_sessions(), 1);

    manager.finish_session("local-1").await.unwrap();
}
