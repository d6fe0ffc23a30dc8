//! Agent trait definitions for dependency injection

use std::path::Path;

use async_trait::async_trait;

use crate::error::AgentResult;
use shared::messages::{
    ArtifactReferencePayload, FinishTestRequest, FinishTestSessionRequest, LabelPayload, LogEntry,
    PlatformPayload, RerunContext, StartTestRequest, StartTestRunRequest, StartTestSessionRequest,
};

/// Typed operations against the Reportal reporting service.
///
/// Each call maps to one REST request; the client never retries. Apart from
/// `get_rerun_tests`, callers treat failures as fail-open: log and continue
/// without the remote side effect.
#[mockall::automock]
#[async_trait]
pub trait ReportingApi: Send + Sync {
    /// Exchange the long-lived access token for a bearer token. Idempotent;
    /// a second call while authenticated is a no-op.
    async fn auth(&self) -> AgentResult<()>;

    /// Register a test run; returns its remote id.
    async fn start_test_run(&self, project_key: &str, body: StartTestRunRequest) -> AgentResult<u64>;

    /// Close a test run, with the end timestamp shifted slightly into the
    /// past to avoid clock-ordering races with the last test.
    async fn finish_test_run(&self, run_id: u64) -> AgentResult<()>;

    /// Update the build label of a registered run.
    async fn patch_test_run_build(&self, run_id: u64, build: &str) -> AgentResult<()>;

    /// Set the platform of a registered run.
    async fn set_test_run_platform(&self, run_id: u64, platform: PlatformPayload) -> AgentResult<()>;

    /// Register a test; returns its remote id.
    async fn start_test(&self, run_id: u64, body: StartTestRequest) -> AgentResult<u64>;

    /// Re-register a known test (rerun path); returns its remote id.
    async fn update_test(&self, run_id: u64, test_id: u64, body: StartTestRequest) -> AgentResult<u64>;

    /// Compensating transaction: drop a registration made in error.
    async fn revert_test_registration(&self, run_id: u64, test_id: u64) -> AgentResult<()>;

    /// Report the final status of a test.
    async fn finish_test(&self, run_id: u64, test_id: u64, body: FinishTestRequest) -> AgentResult<()>;

    /// Ship a batch of buffered log records.
    async fn send_logs(&self, run_id: u64, logs: Vec<LogEntry>) -> AgentResult<()>;

    /// Upload a PNG screenshot taken during the given test.
    async fn send_screenshot(&self, run_id: u64, test_id: u64, path: &Path) -> AgentResult<()>;

    /// Upload a file artifact; run-scoped when no test id is given.
    async fn send_artifact(&self, run_id: u64, test_id: Option<u64>, path: &Path) -> AgentResult<()>;

    /// Attach links to externally hosted artifacts.
    async fn send_artifact_references(
        &self,
        run_id: u64,
        test_id: Option<u64>,
        references: Vec<ArtifactReferencePayload>,
    ) -> AgentResult<()>;

    /// Attach key-value labels; run-scoped when no test id is given.
    async fn send_labels(
        &self,
        run_id: u64,
        test_id: Option<u64>,
        labels: Vec<LabelPayload>,
    ) -> AgentResult<()>;

    /// Register an automation session; returns the remote session id.
    async fn start_test_session(
        &self,
        run_id: u64,
        body: StartTestSessionRequest,
    ) -> AgentResult<String>;

    /// Incrementally associate tests with an open session.
    async fn add_tests_to_session(
        &self,
        run_id: u64,
        session_id: &str,
        test_ids: Vec<u64>,
    ) -> AgentResult<()>;

    /// Close an automation session with its full test association list.
    async fn finish_test_session(
        &self,
        run_id: u64,
        session_id: &str,
        body: FinishTestSessionRequest,
    ) -> AgentResult<()>;

    /// Exchange an opaque run-context token for the rerun decision. The only
    /// call whose failure is fatal to the run.
    async fn get_rerun_tests(&self, run_context: &str) -> AgentResult<RerunContext>;
}
