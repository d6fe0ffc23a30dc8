//! Reportal reporting agent
//!
//! This library reports test execution (runs, tests, automation sessions,
//! logs, artifacts) to a Reportal reporting service over HTTPS. A host test
//! framework drives it through typed lifecycle entry points; the agent never
//! introspects test declarations itself.

pub mod config;
pub mod core;
pub mod error;
pub mod reporter_impl;
pub mod services;
pub mod state;
pub mod traits;
pub mod types;

// Re-export main types
pub use config::AgentConfig;
pub use error::{AgentError, AgentResult};
pub use reporter_impl::Reporter;
pub use services::{BufferingLayer, LogBuffer, RealReportingApi, SessionManager};
pub use state::RunContext;
pub use traits::ReportingApi;
pub use types::*;
