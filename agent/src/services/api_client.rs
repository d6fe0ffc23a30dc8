//! Real reporting API client backed by reqwest
//!
//! One connection pool per client instance, shared by every call. Calls are
//! stateless and never retried; the orchestrator decides what a failure
//! means. Only the token exchange mutates client state, behind a write lock
//! so concurrent callers cannot refresh twice.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Method;
use tokio::sync::RwLock;
use tracing::{debug, error};

use shared::messages::{
    epoch_millis, ArtifactReferencePayload, FinishTestRequest, FinishTestRunRequest,
    FinishTestSessionRequest, ItemsEnvelope, LabelPayload, LogEntry, PlatformPayload,
    RerunContext, StartTestRequest, StartTestRunRequest, StartTestSessionRequest,
    TestRunBuildPatch, TokenRefreshRequest, TokenRefreshResponse, UpdateTestSessionRequest,
};

use crate::error::{AgentError, AgentResult};
use crate::traits::ReportingApi;

#[derive(serde::Deserialize)]
struct IdResponse {
    id: u64,
}

#[derive(serde::Deserialize)]
struct SessionIdResponse {
    id: String,
}

/// Real API client holding the bearer token and the reqwest pool.
pub struct RealReportingApi {
    service_url: String,
    access_token: String,
    client: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl RealReportingApi {
    pub fn new(service_url: &str, access_token: &str) -> Self {
        Self {
            service_url: service_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            client: reqwest::Client::new(),
            token: RwLock::new(None),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.service_url, path)
    }

    async fn execute<F>(&self, method: Method, url: &str, customize: F) -> AgentResult<reqwest::Response>
    where
        F: FnOnce(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    {
        let mut request = self.client.request(method.clone(), url);
        if let Some(token) = self.token.read().await.clone() {
            request = request.bearer_auth(token);
        }
        request = customize(request);

        let response = request.send().await.map_err(|source| {
            error!(%method, %url, error = %source, "request to reporting service failed");
            AgentError::Transport { url: url.to_string(), source }
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(%method, %url, status = status.as_u16(), "reporting service call succeeded");
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            error!(%method, %url, status = status.as_u16(), %body, "reporting service rejected call");
            Err(AgentError::Http {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
                body,
            })
        }
    }

    fn log_payload<T: serde::Serialize>(url: &str, payload: &T) {
        debug!(
            %url,
            payload = %serde_json::to_string(payload).unwrap_or_default(),
            "sending payload"
        );
    }
}

#[async_trait]
impl ReportingApi for RealReportingApi {
    async fn auth(&self) -> AgentResult<()> {
        let mut token = self.token.write().await;
        if token.is_some() {
            return Ok(());
        }

        let url = self.endpoint("/api/iam/v1/auth/refresh");
        let body = TokenRefreshRequest { refresh_token: self.access_token.clone() };
        Self::log_payload(&url, &body);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|source| {
                error!(%url, error = %source, "token exchange failed");
                AgentError::Transport { url: url.clone(), source }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%url, status = status.as_u16(), %body, "token exchange rejected");
            return Err(AgentError::Http {
                method: "POST".to_string(),
                url,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenRefreshResponse = response.json().await.map_err(|source| {
            error!(%url, error = %source, "token exchange returned malformed body");
            AgentError::Transport { url: url.clone(), source }
        })?;

        *token = Some(parsed.auth_token);
        debug!("authenticated with reporting service");
        Ok(())
    }

    async fn start_test_run(&self, project_key: &str, body: StartTestRunRequest) -> AgentResult<u64> {
        let url = self.endpoint("/api/reporting/v1/test-runs");
        Self::log_payload(&url, &body);

        let response = self
            .execute(Method::POST, &url, |req| {
                req.query(&[("projectKey", project_key)]).json(&body)
            })
            .await?;

        let parsed: IdResponse = response
            .json()
            .await
            .map_err(|source| AgentError::Transport { url, source })?;
        Ok(parsed.id)
    }

    async fn finish_test_run(&self, run_id: u64) -> AgentResult<()> {
        let url = self.endpoint(&format!("/api/reporting/v1/test-runs/{run_id}"));
        let body = FinishTestRunRequest::default();
        Self::log_payload(&url, &body);

        self.execute(Method::PUT, &url, |req| req.json(&body)).await?;
        Ok(())
    }

    async fn patch_test_run_build(&self, run_id: u64, build: &str) -> AgentResult<()> {
        let url = self.endpoint(&format!("/api/reporting/v1/test-runs/{run_id}"));
        let body = TestRunBuildPatch { build: build.to_string() };
        Self::log_payload(&url, &body);

        self.execute(Method::PATCH, &url, |req| req.json(&body)).await?;
        Ok(())
    }

    async fn set_test_run_platform(&self, run_id: u64, platform: PlatformPayload) -> AgentResult<()> {
        let url = self.endpoint(&format!("/api/reporting/v1/test-runs/{run_id}/platform"));
        Self::log_payload(&url, &platform);

        self.execute(Method::PUT, &url, |req| req.json(&platform)).await?;
        Ok(())
    }

    async fn start_test(&self, run_id: u64, body: StartTestRequest) -> AgentResult<u64> {
        let url = self.endpoint(&format!("/api/reporting/v1/test-runs/{run_id}/tests"));
        Self::log_payload(&url, &body);

        let response = self.execute(Method::POST, &url, |req| req.json(&body)).await?;
        let parsed: IdResponse = response
            .json()
            .await
            .map_err(|source| AgentError::Transport { url, source })?;
        Ok(parsed.id)
    }

    async fn update_test(&self, run_id: u64, test_id: u64, body: StartTestRequest) -> AgentResult<u64> {
        let url = self.endpoint(&format!("/api/reporting/v1/test-runs/{run_id}/tests/{test_id}"));
        Self::log_payload(&url, &body);

        let response = self.execute(Method::PUT, &url, |req| req.json(&body)).await?;
        let parsed: IdResponse = response
            .json()
            .await
            .map_err(|source| AgentError::Transport { url, source })?;
        Ok(parsed.id)
    }

    async fn revert_test_registration(&self, run_id: u64, test_id: u64) -> AgentResult<()> {
        let url = self.endpoint(&format!("/api/reporting/v1/test-runs/{run_id}/tests/{test_id}"));
        self.execute(Method::DELETE, &url, |req| req).await?;
        Ok(())
    }

    async fn finish_test(&self, run_id: u64, test_id: u64, body: FinishTestRequest) -> AgentResult<()> {
        let url = self.endpoint(&format!("/api/reporting/v1/test-runs/{run_id}/tests/{test_id}"));
        Self::log_payload(&url, &body);

        self.execute(Method::PUT, &url, |req| req.json(&body)).await?;
        Ok(())
    }

    async fn send_logs(&self, run_id: u64, logs: Vec<LogEntry>) -> AgentResult<()> {
        let url = self.endpoint(&format!("/api/reporting/v1/test-runs/{run_id}/logs"));
        Self::log_payload(&url, &logs);

        self.execute(Method::POST, &url, |req| req.json(&logs)).await?;
        Ok(())
    }

    async fn send_screenshot(&self, run_id: u64, test_id: u64, path: &Path) -> AgentResult<()> {
        let url = self.endpoint(&format!(
            "/api/reporting/v1/test-runs/{run_id}/tests/{test_id}/screenshots"
        ));
        let image = tokio::fs::read(path).await?;
        debug!(%url, bytes = image.len(), "uploading screenshot");

        self.execute(Method::POST, &url, |req| {
            req.header("Content-Type", "image/png")
                .header("x-reportal-screenshot-captured-at", epoch_millis().to_string())
                .body(image)
        })
        .await?;
        Ok(())
    }

    async fn send_artifact(&self, run_id: u64, test_id: Option<u64>, path: &Path) -> AgentResult<()> {
        let url = match test_id {
            Some(test_id) => self.endpoint(&format!(
                "/api/reporting/v1/test-runs/{run_id}/tests/{test_id}/artifacts"
            )),
            None => self.endpoint(&format!("/api/reporting/v1/test-runs/{run_id}/artifacts")),
        };

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());
        let contents = tokio::fs::read(path).await?;
        debug!(%url, %file_name, bytes = contents.len(), "uploading artifact");

        let part = reqwest::multipart::Part::bytes(contents).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        self.execute(Method::POST, &url, |req| req.multipart(form)).await?;
        Ok(())
    }

    async fn send_artifact_references(
        &self,
        run_id: u64,
        test_id: Option<u64>,
        references: Vec<ArtifactReferencePayload>,
    ) -> AgentResult<()> {
        let url = match test_id {
            Some(test_id) => self.endpoint(&format!(
                "/api/reporting/v1/test-runs/{run_id}/tests/{test_id}/artifact-references"
            )),
            None => self.endpoint(&format!(
                "/api/reporting/v1/test-runs/{run_id}/artifact-references"
            )),
        };
        let body = ItemsEnvelope::new(references);
        Self::log_payload(&url, &body);

        self.execute(Method::PUT, &url, |req| req.json(&body)).await?;
        Ok(())
    }

    async fn send_labels(
        &self,
        run_id: u64,
        test_id: Option<u64>,
        labels: Vec<LabelPayload>,
    ) -> AgentResult<()> {
        let url = match test_id {
            Some(test_id) => self.endpoint(&format!(
                "/api/reporting/v1/test-runs/{run_id}/tests/{test_id}/labels"
            )),
            None => self.endpoint(&format!("/api/reporting/v1/test-runs/{run_id}/labels")),
        };
        let body = ItemsEnvelope::new(labels);
        Self::log_payload(&url, &body);

        self.execute(Method::PUT, &url, |req| req.json(&body)).await?;
        Ok(())
    }

    async fn start_test_session(
        &self,
        run_id: u64,
        body: StartTestSessionRequest,
    ) -> AgentResult<String> {
        let url = self.endpoint(&format!("/api/reporting/v1/test-runs/{run_id}/test-sessions"));
        Self::log_payload(&url, &body);

        let response = self.execute(Method::POST, &url, |req| req.json(&body)).await?;
        let parsed: SessionIdResponse = response
            .json()
            .await
            .map_err(|source| AgentError::Transport { url, source })?;
        Ok(parsed.id)
    }

    async fn add_tests_to_session(
        &self,
        run_id: u64,
        session_id: &str,
        test_ids: Vec<u64>,
    ) -> AgentResult<()> {
        let url = self.endpoint(&format!(
            "/api/reporting/v1/test-runs/{run_id}/test-sessions/{session_id}"
        ));
        let body = UpdateTestSessionRequest { test_ids };
        Self::log_payload(&url, &body);

        self.execute(Method::PUT, &url, |req| req.json(&body)).await?;
        Ok(())
    }

    async fn finish_test_session(
        &self,
        run_id: u64,
        session_id: &str,
        body: FinishTestSessionRequest,
    ) -> AgentResult<()> {
        let url = self.endpoint(&format!(
            "/api/reporting/v1/test-runs/{run_id}/test-sessions/{session_id}"
        ));
        Self::log_payload(&url, &body);

        self.execute(Method::PUT, &url, |req| req.json(&body)).await?;
        Ok(())
    }

    async fn get_rerun_tests(&self, run_context: &str) -> AgentResult<RerunContext> {
        let url = self.endpoint("/api/reporting/v1/run-context-exchanges");
        // The token is an opaque JSON document supplied by the caller.
        let body: serde_json::Value = serde_json::from_str(run_context)?;
        Self::log_payload(&url, &body);

        let response = self.execute(Method::POST, &url, |req| req.json(&body)).await?;
        let parsed: RerunContext = response
            .json()
            .await
            .map_err(|source| AgentError::Transport { url, source })?;
        Ok(parsed)
    }
}
