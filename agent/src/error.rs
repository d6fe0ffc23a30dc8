//! Agent error types

use thiserror::Error;

/// Result type for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned {status}: {body}")]
    Http {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("agent is not authenticated with the reporting service")]
    Unauthenticated,

    #[error("test run aborted: {reason}")]
    RunAborted { reason: String },

    #[error("missing required configuration: {}", fields.join(", "))]
    MissingConfig { fields: Vec<String> },

    #[error("no active test run")]
    InactiveRun,

    #[error("no active test")]
    InactiveTest,

    #[error("unknown session: {session_id}")]
    UnknownSession { session_id: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    /// True for the one failure class the host must treat as fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AgentError::RunAborted { .. })
    }
}
