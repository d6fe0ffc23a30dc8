//! Test-run lifecycle payloads

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::offset_timestamp;

/// Run configuration block nested in the start-run body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunConfigPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treat_skips_as_failures: Option<bool>,
}

/// Milestone the run is attached to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestonePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationTargetType {
    EmailRecipients,
    SlackChannels,
    MsTeamsChannels,
}

/// One notification destination (channel list or recipient list).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTargetPayload {
    #[serde(rename = "type")]
    pub target_type: NotificationTargetType,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsPayload {
    pub notify_on_each_failure: bool,
    pub targets: Vec<NotificationTargetPayload>,
}

/// CI environment snapshot resolved at run start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CiContextPayload {
    pub ci_type: String,
    pub env_variables: HashMap<String, String>,
}

/// Body for `POST /api/reporting/v1/test-runs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTestRunRequest {
    pub uuid: String,
    pub name: String,
    pub framework: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<TestRunConfigPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<MilestonePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_context: Option<CiContextPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationsPayload>,
}

impl StartTestRunRequest {
    pub fn new(name: impl Into<String>, framework: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4().to_string(),
            name: name.into(),
            framework: framework.into(),
            started_at: offset_timestamp(),
            config: None,
            milestone: None,
            ci_context: None,
            notifications: None,
        }
    }
}

/// Body for `PUT /api/reporting/v1/test-runs/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishTestRunRequest {
    pub ended_at: DateTime<Utc>,
}

impl Default for FinishTestRunRequest {
    fn default() -> Self {
        Self { ended_at: offset_timestamp() }
    }
}

/// Body for `PATCH /api/reporting/v1/test-runs/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunBuildPatch {
    pub build: String,
}

/// Body for `PUT /api/reporting/v1/test-runs/{id}/platform`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_run_omits_absent_fields() {
        let body = StartTestRunRequest::new("nightly", "rust");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["name"], "nightly");
        assert_eq!(json["framework"], "rust");
        assert!(json.get("config").is_none());
        assert!(json.get("milestone").is_none());
        assert!(json.get("ciContext").is_none());
        assert!(json.get("notifications").is_none());
    }

    #[test]
    fn test_start_run_config_uses_camel_case() {
        let mut body = StartTestRunRequest::new("nightly", "rust");
        body.config = Some(TestRunConfigPayload {
            environment: Some("staging".into()),
            build: Some("1.2.3".into()),
            treat_skips_as_failures: Some(true),
        });

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["config"]["environment"], "staging");
        assert_eq!(json["config"]["treatSkipsAsFailures"], true);
    }

    #[test]
    fn test_notification_target_type_on_wire() {
        let target = NotificationTargetPayload {
            target_type: NotificationTargetType::SlackChannels,
            value: "qa-alerts".into(),
        };
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["type"], "SLACK_CHANNELS");
        assert_eq!(json["value"], "qa-alerts");
    }

    #[test]
    fn test_finish_run_timestamp_is_in_the_past() {
        let body = FinishTestRunRequest::default();
        assert!(body.ended_at < Utc::now());
    }
}
