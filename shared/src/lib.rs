//! Shared types for the Reportal reporting agent
//!
//! Contains the wire-level payloads exchanged with the Reportal service and
//! the handful of enums both the agent and host integrations need. Anything
//! internal to the agent's machinery stays in the `agent` crate.

pub mod errors;
pub mod logging;
pub mod messages;
pub mod types;

pub use errors::*;
pub use types::*;

// Re-export the wire payloads host integrations are likely to touch
pub use messages::{
    // Run lifecycle
    CiContextPayload, FinishTestRunRequest, MilestonePayload, NotificationTargetPayload,
    NotificationTargetType, NotificationsPayload, StartTestRunRequest, TestRunConfigPayload,

    // Test lifecycle
    CorrelationData, FinishTestRequest, StartTestRequest,

    // Sessions, logs, artifacts
    ArtifactReferencePayload, FinishTestSessionRequest, LabelPayload, LogEntry,
    StartTestSessionRequest, UpdateTestSessionRequest,

    // Rerun resolution
    RerunContext, RerunTest,
};
