//! Wire payloads for the Reportal reporting API
//!
//! This module organizes the request/response bodies by lifecycle area:
//! - `auth`: token exchange
//! - `run`: test-run start/finish and run-level metadata
//! - `test`: test start/finish
//! - `session`: automation-session start/finish
//! - `log`: batched log records
//! - `artifact`: artifact references and labels
//! - `rerun`: run-context exchange (rerun resolution)
//!
//! Every payload serializes with lowerCamelCase field names and omits fields
//! that have no value, per the service contract.

pub mod artifact;
pub mod auth;
pub mod log;
pub mod rerun;
pub mod run;
pub mod session;

pub use artifact::{ArtifactReferencePayload, ItemsEnvelope, LabelPayload};
pub use auth::{TokenRefreshRequest, TokenRefreshResponse};
pub use log::LogEntry;
pub use rerun::{RerunContext, RerunTest};
pub use run::{
    CiContextPayload, FinishTestRunRequest, MilestonePayload, NotificationTargetPayload,
    NotificationTargetType, NotificationsPayload, PlatformPayload, StartTestRunRequest,
    TestRunBuildPatch, TestRunConfigPayload,
};
pub use session::{FinishTestSessionRequest, StartTestSessionRequest, UpdateTestSessionRequest};
pub use test::{CorrelationData, FinishTestRequest, StartTestRequest};

use chrono::{DateTime, Duration, Utc};

/// Timestamp used for start/finish markers.
///
/// Shifted one second into the past so server-side ordering never places a
/// run boundary ahead of the last test's own finish timestamp.
pub fn offset_timestamp() -> DateTime<Utc> {
    Utc::now() - Duration::seconds(1)
}

/// Milliseconds since the Unix epoch, as the service expects for log records
/// and screenshot capture markers.
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}
