//! Automation-session tracking
//!
//! One record per open driver session. Tests that start while a session is
//! open accumulate on it, and each new association is also pushed to the
//! service incrementally so a crash mid-run still leaves the server with a
//! usable picture.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::error;

use shared::messages::{FinishTestSessionRequest, StartTestSessionRequest};

use crate::error::{AgentError, AgentResult};
use crate::state::RunContext;
use crate::traits::ReportingApi;
use crate::types::SessionRecord;

/// Tracks concurrently open automation sessions for one worker process.
pub struct SessionManager<A: ReportingApi> {
    api: Arc<A>,
    context: Arc<RunContext>,
    sessions: Mutex<HashMap<String, SessionRecord>>,
}

impl<A: ReportingApi> SessionManager<A> {
    pub fn new(api: Arc<A>, context: Arc<RunContext>) -> Self {
        Self { api, context, sessions: Mutex::new(HashMap::new()) }
    }

    /// Register a freshly opened driver session. When a test is active its
    /// id seeds the association list. Remote registration failure leaves the
    /// session tracked locally but unregistered; it is not an error.
    pub async fn start_session(
        &self,
        session_id: &str,
        capabilities: serde_json::Value,
        desired_capabilities: serde_json::Value,
    ) {
        let mut related_tests = Vec::new();
        if self.context.test_is_active() {
            if let Ok(test_id) = self.context.test_id() {
                related_tests.push(test_id);
            }
        }

        self.sessions.lock().insert(
            session_id.to_string(),
            SessionRecord {
                session_id: session_id.to_string(),
                reportal_session_id: None,
                related_tests: related_tests.clone(),
            },
        );

        if !self.context.run_is_active() {
            return;
        }
        let Ok(run_id) = self.context.run_id() else {
            return;
        };

        let body = StartTestSessionRequest {
            session_id: session_id.to_string(),
            capabilities,
            desired_capabilities,
            test_ids: related_tests,
        };
        match self.api.start_test_session(run_id, body).await {
            Ok(remote_id) => {
                if let Some(record) = self.sessions.lock().get_mut(session_id) {
                    record.reportal_session_id = Some(remote_id);
                }
            }
            Err(e) => error!(session_id, error = %e, "failed to start test session"),
        }
    }

    /// Associate a newly started test with every open session.
    pub async fn add_test(&self, test_id: u64) {
        let targets: Vec<(String, Option<String>)> = {
            let mut sessions = self.sessions.lock();
            sessions
                .values_mut()
                .map(|record| {
                    record.related_tests.push(test_id);
                    (record.session_id.clone(), record.reportal_session_id.clone())
                })
                .collect()
        };

        if !self.context.run_is_active() {
            return;
        }
        let Ok(run_id) = self.context.run_id() else {
            return;
        };

        for (session_id, remote_id) in targets {
            let Some(remote_id) = remote_id else {
                continue;
            };
            // Fire-and-forget: the full list goes out again at session finish.
            if let Err(e) = self
                .api
                .add_tests_to_session(run_id, &remote_id, vec![test_id])
                .await
            {
                error!(session_id, error = %e, "failed to add test to session");
            }
        }
    }

    /// Close a session and report its full association list. An unknown id
    /// means the instrumentation layer closed a driver it never opened; that
    /// is a contract violation, not a recoverable condition.
    pub async fn finish_session(&self, session_id: &str) -> AgentResult<()> {
        let record = self
            .sessions
            .lock()
            .remove(session_id)
            .ok_or_else(|| AgentError::UnknownSession { session_id: session_id.to_string() })?;

        if !self.context.run_is_active() {
            return Ok(());
        }
        let Ok(run_id) = self.context.run_id() else {
            return Ok(());
        };
        let Some(remote_id) = record.reportal_session_id else {
            return Ok(());
        };

        let body = FinishTestSessionRequest::new(record.related_tests);
        if let Err(e) = self.api.finish_test_session(run_id, &remote_id, body).await {
            error!(session_id, error = %e, "failed to finish test session");
        }
        Ok(())
    }

    /// Finish every open session; invoked once at run finish. Iterates a
    /// snapshot of ids so removal does not race the iteration.
    pub async fn finish_all_sessions(&self) {
        let session_ids: Vec<String> = self.sessions.lock().keys().cloned().collect();
        for session_id in session_ids {
            if let Err(e) = self.finish_session(&session_id).await {
                error!(session_id, error = %e, "failed to finish session during run teardown");
            }
        }
    }

    /// Number of currently open sessions.
    pub fn open_sessions(&self) -> usize {
        self.sessions.lock().len()
    }
}
