//! Reporter implementation with dependency injection
//!
//! The lifecycle state machine: consumes host-framework events, mutates the
//! run/test context, and drives the API client, session manager and log
//! buffer. Every remote failure except the rerun-context exchange is
//! fail-open; a reporting outage must never fail the user's suite.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, warn};

use shared::messages::{
    ArtifactReferencePayload, CorrelationData, FinishTestRequest, LabelPayload, MilestonePayload,
    NotificationTargetPayload, NotificationTargetType, NotificationsPayload, PlatformPayload,
    StartTestRequest, StartTestRunRequest, TestRunConfigPayload,
};

use crate::config::AgentConfig;
use crate::core::{self, resolve_outcome};
use crate::error::{AgentError, AgentResult};
use crate::services::{BufferingLayer, LogBuffer, RealReportingApi, SessionManager};
use crate::state::RunContext;
use crate::traits::ReportingApi;
use crate::types::{ReportEvent, Test, TestItem, TestRun};

/// Lifecycle orchestrator, generic over the API seam so tests can substitute
/// a mock client.
pub struct Reporter<A: ReportingApi + 'static> {
    config: AgentConfig,
    api: Arc<A>,
    context: Arc<RunContext>,
    sessions: SessionManager<A>,
    logs: Arc<LogBuffer>,
}

impl Reporter<RealReportingApi> {
    /// Build a reporter talking to the real service. Fails when required
    /// configuration is missing so the host can disable itself with one
    /// warning instead of reporting into the void.
    pub fn from_config(config: AgentConfig) -> AgentResult<Self> {
        config.validate()?;
        let api = RealReportingApi::new(&config.server.hostname, &config.server.access_token);
        Ok(Self::with_api(config, api))
    }
}

impl<A: ReportingApi + 'static> Reporter<A> {
    /// Wire the components around an externally supplied API client. Must be
    /// called inside a tokio runtime; the log delivery worker starts here.
    pub fn with_api(config: AgentConfig, api: A) -> Self {
        let api = Arc::new(api);
        let context = RunContext::new();
        let sessions = SessionManager::new(Arc::clone(&api), Arc::clone(&context));
        let logs = Arc::new(LogBuffer::new(
            Arc::clone(&api),
            Arc::clone(&context),
            config.send_logs,
        ));

        Self { config, api, context, sessions, logs }
    }

    pub fn context(&self) -> &Arc<RunContext> {
        &self.context
    }

    pub fn sessions(&self) -> &SessionManager<A> {
        &self.sessions
    }

    pub fn log_buffer(&self) -> &Arc<LogBuffer> {
        &self.logs
    }

    /// Layer to hang into the host's `tracing` subscriber stack so log
    /// records flow into the buffer.
    pub fn buffering_layer(&self) -> BufferingLayer {
        BufferingLayer::new(Arc::clone(&self.logs))
    }

    /// Authenticate if not yet authenticated. Auth failures are logged and
    /// swallowed: subsequent calls will fail and be handled fail-open.
    async fn authorize(&self) {
        if let Err(e) = self.api.auth().await {
            warn!(error = %e, "authentication with reporting service failed");
        }
    }

    fn notification_targets(&self) -> Option<NotificationsPayload> {
        let notifications = self.config.notifications.as_ref()?;

        let mut targets = Vec::new();
        if let Some(emails) = &notifications.emails {
            targets.push(NotificationTargetPayload {
                target_type: NotificationTargetType::EmailRecipients,
                value: emails.clone(),
            });
        }
        if let Some(channels) = &notifications.slack_channels {
            targets.push(NotificationTargetPayload {
                target_type: NotificationTargetType::SlackChannels,
                value: channels.clone(),
            });
        }
        if let Some(channels) = &notifications.ms_teams_channels {
            targets.push(NotificationTargetPayload {
                target_type: NotificationTargetType::MsTeamsChannels,
                value: channels.clone(),
            });
        }

        Some(NotificationsPayload {
            notify_on_each_failure: notifications.notify_on_each_failure,
            targets,
        })
    }

    /// Start the run. The only fatal path lives here: a configured rerun
    /// context that cannot be resolved (or forbids the run) returns
    /// `AgentError::RunAborted`, which the host must treat as a session
    /// abort. A plain start-run API failure is fail-open: the run stays
    /// inactive and every later operation becomes a no-op.
    pub async fn start_test_run(&self) -> AgentResult<()> {
        self.authorize().await;

        let run = TestRun::new(
            self.config.run.display_name.clone(),
            self.config.run.environment.clone(),
            self.config.run.build.clone(),
        );
        let mut request = StartTestRunRequest::new(&run.name, &self.config.framework);
        request.config = Some(TestRunConfigPayload {
            environment: run.environment.clone(),
            build: run.build.clone(),
            treat_skips_as_failures: Some(self.config.run.treat_skips_as_failures),
        });
        request.milestone = self.config.milestone.as_ref().map(|m| MilestonePayload {
            id: m.id.clone(),
            name: m.name.clone(),
        });
        request.ci_context = core::resolve_ci_context();
        request.notifications = self.notification_targets();
        self.context.set_test_run(run);

        if let Some(token) = &self.config.run.context {
            let rerun = self.api.get_rerun_tests(token).await.map_err(|e| {
                error!(error = %e, "failed to resolve run context");
                AgentError::RunAborted { reason: format!("failed to resolve run context: {e}") }
            })?;

            if let Some(uuid) = rerun.test_run_uuid {
                request.uuid = uuid;
            }
            if !rerun.run_allowed {
                let reason = rerun
                    .reason
                    .unwrap_or_else(|| "run not allowed by the reporting service".to_string());
                return Err(AgentError::RunAborted { reason });
            }
            if rerun.run_only_specific_tests && rerun.tests_to_run.is_empty() {
                return Err(AgentError::RunAborted { reason: "no tests to run".to_string() });
            }
        }

        match self.api.start_test_run(&self.config.project_key, request).await {
            Ok(run_id) => {
                self.context.assign_run_id(run_id);
                debug!(run_id, "test run started");
            }
            Err(e) => error!(error = %e, "failed to start test run; continuing unreported"),
        }
        Ok(())
    }

    /// Join a run registered by another worker process.
    pub fn adopt_run(&self, run_id: u64) {
        let name = self
            .config
            .run
            .display_name
            .clone()
            .unwrap_or_else(|| "Unnamed".to_string());
        self.context.adopt_run(run_id, name);
    }

    /// Filter collected tests against the rerun decision. Without a rerun
    /// token the input passes through untouched. A failed exchange here is
    /// non-fatal: the full collection runs.
    pub async fn filter_test_items(&self, items: Vec<TestItem>) -> Vec<TestItem> {
        let Some(token) = &self.config.run.context else {
            return items;
        };

        self.authorize().await;
        match self.api.get_rerun_tests(token).await {
            Ok(rerun) => core::filter_items(items, &rerun.tests_to_run),
            Err(e) => {
                error!(error = %e, "failed to filter tests; running full collection");
                items
            }
        }
    }

    /// Register the test a setup event describes. No-op while the run is
    /// inactive. On registration failure the test stays inactive and every
    /// later operation on it is skipped.
    pub async fn start_test(&self, event: &ReportEvent) {
        if !self.context.run_is_active() {
            return;
        }
        self.authorize().await;

        let test = Test::new(
            &event.name,
            &event.file,
            event.maintainers.clone(),
            event.labels.clone(),
        );
        self.context.set_test(test);

        let mut request = StartTestRequest::new(&event.name, &event.file, &event.name);
        if !event.maintainers.is_empty() {
            request.maintainer = Some(event.maintainers.join(","));
        }
        if !event.labels.is_empty() {
            request.labels = Some(
                event
                    .labels
                    .iter()
                    .map(|(key, value)| LabelPayload::new(key, value))
                    .collect(),
            );
        }
        request.correlation_data = CorrelationData::new(&event.name).encode().ok();

        let Ok(run_id) = self.context.run_id() else {
            return;
        };

        let registered = match event.reportal_id {
            Some(known_id) => self.api.update_test(run_id, known_id, request).await,
            None => self.api.start_test(run_id, request).await,
        };
        let test_id = match registered {
            Ok(test_id) => test_id,
            Err(e) => {
                error!(test = %event.name, error = %e, "failed to start test");
                return;
            }
        };

        self.context.assign_test_id(test_id);
        self.sessions.add_test(test_id).await;

        if !event.artifact_references.is_empty() {
            let references = event
                .artifact_references
                .iter()
                .map(|(name, value)| ArtifactReferencePayload::new(name, value))
                .collect();
            if let Err(e) = self
                .api
                .send_artifact_references(run_id, Some(test_id), references)
                .await
            {
                error!(error = %e, "failed to send artifact references");
            }
        }

        for artifact in &event.artifacts {
            if let Err(e) = self.api.send_artifact(run_id, Some(test_id), artifact).await {
                error!(artifact = %artifact.display(), error = %e, "failed to send artifact");
            }
        }
    }

    /// Report the final status of the active test. No-op when the test never
    /// became active or was reverted. The active-test slot is cleared
    /// whatever the remote call does, so the next test can start cleanly.
    pub async fn finish_test(&self, event: &ReportEvent) {
        if !self.context.test_is_active() {
            return;
        }
        if self.context.test_is_reverted() {
            self.context.clear_test();
            return;
        }
        self.authorize().await;

        let resolution = resolve_outcome(event);

        let (Ok(run_id), Ok(test_id)) = (self.context.run_id(), self.context.test_id()) else {
            self.context.clear_test();
            return;
        };

        // TCM mirroring happens while the test is still addressable; each
        // failure is independent of the test's own result.
        for label in core::tcm::case_labels(&event.tcm_refs) {
            if let Err(e) = self.api.send_labels(run_id, Some(test_id), vec![label]).await {
                error!(error = %e, "failed to attach TCM label");
            }
        }

        let request = FinishTestRequest::new(resolution.status, resolution.reason);
        if let Err(e) = self.api.finish_test(run_id, test_id, request).await {
            error!(test = %event.name, error = %e, "failed to finish test");
        }

        self.context.clear_test();
    }

    /// Close the run: report the end timestamp, finish dangling sessions and
    /// push out trailing logs. No-op when the run never became active.
    pub async fn finish_test_run(&self) {
        if !self.context.run_is_active() {
            return;
        }
        self.authorize().await;

        if let Ok(run_id) = self.context.run_id() {
            if let Err(e) = self.api.finish_test_run(run_id).await {
                error!(error = %e, "failed to finish test run");
            }
        }

        self.sessions.finish_all_sessions().await;
        self.logs.flush().await;
    }

    /// Compensating transaction: drop the active test's registration so the
    /// teardown event will not report it.
    pub async fn revert_test_registration(&self) -> AgentResult<()> {
        if !self.context.test_is_active() {
            return Err(AgentError::InactiveTest);
        }
        let run_id = self.context.run_id()?;
        let test_id = self.context.test_id()?;

        match self.api.revert_test_registration(run_id, test_id).await {
            Ok(()) => self.context.mark_test_reverted(),
            Err(e) => error!(error = %e, "failed to revert test registration"),
        }
        Ok(())
    }

    /// Attach a screenshot to the active test; dropped when no test is active.
    pub async fn attach_test_screenshot(&self, path: &Path) {
        if !self.context.test_is_active() {
            debug!("no active test; dropping screenshot");
            return;
        }
        let (Ok(run_id), Ok(test_id)) = (self.context.run_id(), self.context.test_id()) else {
            return;
        };
        if let Err(e) = self.api.send_screenshot(run_id, test_id, path).await {
            error!(error = %e, "failed to send screenshot");
        }
    }

    /// Attach a file artifact to the active test.
    pub async fn attach_test_artifact(&self, path: &Path) {
        if !self.context.test_is_active() {
            debug!("no active test; dropping artifact");
            return;
        }
        let (Ok(run_id), Ok(test_id)) = (self.context.run_id(), self.context.test_id()) else {
            return;
        };
        if let Err(e) = self.api.send_artifact(run_id, Some(test_id), path).await {
            error!(error = %e, "failed to send artifact");
        }
    }

    /// Attach a file artifact at run scope.
    pub async fn attach_run_artifact(&self, path: &Path) {
        if !self.context.run_is_active() {
            return;
        }
        let Ok(run_id) = self.context.run_id() else {
            return;
        };
        if let Err(e) = self.api.send_artifact(run_id, None, path).await {
            error!(error = %e, "failed to send run artifact");
        }
    }

    /// Attach a named artifact link to the active test.
    pub async fn attach_test_artifact_reference(&self, name: &str, value: &str) {
        if !self.context.test_is_active() {
            return;
        }
        let (Ok(run_id), Ok(test_id)) = (self.context.run_id(), self.context.test_id()) else {
            return;
        };
        let references = vec![ArtifactReferencePayload::new(name, value)];
        if let Err(e) = self
            .api
            .send_artifact_references(run_id, Some(test_id), references)
            .await
        {
            error!(error = %e, "failed to send artifact reference");
        }
    }

    /// Attach a named artifact link at run scope.
    pub async fn attach_run_artifact_reference(&self, name: &str, value: &str) {
        if !self.context.run_is_active() {
            return;
        }
        let Ok(run_id) = self.context.run_id() else {
            return;
        };
        let references = vec![ArtifactReferencePayload::new(name, value)];
        if let Err(e) = self.api.send_artifact_references(run_id, None, references).await {
            error!(error = %e, "failed to send run artifact reference");
        }
    }

    /// Attach a key-value label to the active test.
    pub async fn attach_test_label(&self, key: &str, value: &str) {
        if !self.context.test_is_active() {
            return;
        }
        let (Ok(run_id), Ok(test_id)) = (self.context.run_id(), self.context.test_id()) else {
            return;
        };
        let labels = vec![LabelPayload::new(key, value)];
        if let Err(e) = self.api.send_labels(run_id, Some(test_id), labels).await {
            error!(error = %e, "failed to send label");
        }
    }

    /// Attach a key-value label at run scope.
    pub async fn attach_run_label(&self, key: &str, value: &str) {
        if !self.context.run_is_active() {
            return;
        }
        let Ok(run_id) = self.context.run_id() else {
            return;
        };
        let labels = vec![LabelPayload::new(key, value)];
        if let Err(e) = self.api.send_labels(run_id, None, labels).await {
            error!(error = %e, "failed to send run label");
        }
    }

    /// Update the build recorded on the active run.
    pub async fn set_run_build(&self, build: &str) -> AgentResult<()> {
        if build.trim().is_empty() {
            return Err(AgentError::InvalidArgument { message: "build must not be empty".into() });
        }
        if !self.context.run_is_active() {
            return Err(AgentError::InactiveRun);
        }
        let run_id = self.context.run_id()?;
        if let Err(e) = self.api.patch_test_run_build(run_id, build).await {
            error!(error = %e, "failed to set build");
        }
        Ok(())
    }

    /// Record the system-under-test locale on the active run.
    pub async fn set_run_locale(&self, locale: &str) -> AgentResult<()> {
        if locale.trim().is_empty() {
            return Err(AgentError::InvalidArgument { message: "locale must not be empty".into() });
        }
        if !self.context.run_is_active() {
            return Err(AgentError::InactiveRun);
        }
        let run_id = self.context.run_id()?;
        let labels = vec![LabelPayload::new(core::tcm::SUT_LOCALE, locale)];
        if let Err(e) = self.api.send_labels(run_id, None, labels).await {
            error!(error = %e, "failed to set locale");
        }
        Ok(())
    }

    /// Record the platform (and optional version) on the active run.
    pub async fn set_run_platform(&self, name: &str, version: Option<&str>) -> AgentResult<()> {
        if name.trim().is_empty() {
            return Err(AgentError::InvalidArgument { message: "platform must not be empty".into() });
        }
        if !self.context.run_is_active() {
            return Err(AgentError::InactiveRun);
        }
        let run_id = self.context.run_id()?;
        let platform = PlatformPayload {
            name: name.to_string(),
            version: version.map(str::to_string),
        };
        if let Err(e) = self.api.set_test_run_platform(run_id, platform).await {
            error!(error = %e, "failed to set platform");
        }
        Ok(())
    }
}
