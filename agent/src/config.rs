//! Agent configuration
//!
//! Settings arrive either from the embedding host directly or from
//! `REPORTAL_*` environment variables (with `.env` support). A config that
//! fails validation is meant to disable the plugin in the host: the returned
//! error enumerates every missing field so the user fixes them in one pass.

use std::env;

use crate::error::{AgentError, AgentResult};

/// Connection settings for the reporting service.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub hostname: String,
    pub access_token: String,
}

/// Per-run metadata.
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    pub display_name: Option<String>,
    pub environment: Option<String>,
    pub build: Option<String>,
    /// Opaque rerun-context token handed to the run-context exchange.
    pub context: Option<String>,
    pub treat_skips_as_failures: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MilestoneConfig {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationsConfig {
    pub notify_on_each_failure: bool,
    pub emails: Option<String>,
    pub slack_channels: Option<String>,
    pub ms_teams_channels: Option<String>,
}

/// Full agent configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub enabled: bool,
    pub project_key: String,
    pub framework: String,
    pub server: ServerConfig,
    pub run: RunSettings,
    pub send_logs: bool,
    pub milestone: Option<MilestoneConfig>,
    pub notifications: Option<NotificationsConfig>,
}

impl AgentConfig {
    /// Minimal valid configuration.
    pub fn new(
        hostname: impl Into<String>,
        access_token: impl Into<String>,
        project_key: impl Into<String>,
    ) -> Self {
        Self {
            enabled: true,
            project_key: project_key.into(),
            framework: "rust".to_string(),
            server: ServerConfig {
                hostname: hostname.into(),
                access_token: access_token.into(),
            },
            run: RunSettings::default(),
            send_logs: true,
            milestone: None,
            notifications: None,
        }
    }

    /// Load configuration from `REPORTAL_*` environment variables.
    pub fn from_env() -> AgentResult<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::new(
            env::var("REPORTAL_HOSTNAME").unwrap_or_default(),
            env::var("REPORTAL_ACCESS_TOKEN").unwrap_or_default(),
            env::var("REPORTAL_PROJECT_KEY").unwrap_or_default(),
        );

        config.enabled = env_flag("REPORTAL_ENABLED", true);
        config.send_logs = env_flag("REPORTAL_SEND_LOGS", true);
        if let Ok(framework) = env::var("REPORTAL_FRAMEWORK") {
            config.framework = framework;
        }

        config.run = RunSettings {
            display_name: env::var("REPORTAL_RUN_DISPLAY_NAME").ok(),
            environment: env::var("REPORTAL_RUN_ENVIRONMENT").ok(),
            build: env::var("REPORTAL_RUN_BUILD").ok(),
            context: env::var("REPORTAL_RUN_CONTEXT").ok(),
            treat_skips_as_failures: env_flag("REPORTAL_RUN_TREAT_SKIPS_AS_FAILURES", false),
        };

        let milestone = MilestoneConfig {
            id: env::var("REPORTAL_MILESTONE_ID").ok(),
            name: env::var("REPORTAL_MILESTONE_NAME").ok(),
        };
        if milestone.id.is_some() || milestone.name.is_some() {
            config.milestone = Some(milestone);
        }

        let notifications = NotificationsConfig {
            notify_on_each_failure: env_flag("REPORTAL_NOTIFICATION_NOTIFY_ON_EACH_FAILURE", false),
            emails: env::var("REPORTAL_NOTIFICATION_EMAILS").ok(),
            slack_channels: env::var("REPORTAL_NOTIFICATION_SLACK_CHANNELS").ok(),
            ms_teams_channels: env::var("REPORTAL_NOTIFICATION_MS_TEAMS_CHANNELS").ok(),
        };
        if notifications.emails.is_some()
            || notifications.slack_channels.is_some()
            || notifications.ms_teams_channels.is_some()
        {
            config.notifications = Some(notifications);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check required fields, reporting every missing one at once.
    pub fn validate(&self) -> AgentResult<()> {
        let mut missing = Vec::new();
        if self.server.hostname.trim().is_empty() {
            missing.push("server.hostname".to_string());
        }
        if self.server.access_token.trim().is_empty() {
            missing.push("server.access_token".to_string());
        }
        if self.project_key.trim().is_empty() {
            missing.push("project_key".to_string());
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AgentError::MissingConfig { fields: missing })
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}
