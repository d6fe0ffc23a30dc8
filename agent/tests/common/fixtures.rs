//! Test fixtures for agent integration tests

use agent::config::AgentConfig;
use agent::types::{RawOutcome, ReportEvent, TestPhase};

/// Minimal configuration pointing at a mock server.
pub fn test_config(server_uri: &str) -> AgentConfig {
    let mut config = AgentConfig::new(server_uri, "access-token", "ACME");
    config.run.display_name = Some("integration run".to_string());
    config.run.environment = Some("ci".to_string());
    config
}

/// Teardown-stage event for a test that passed.
pub fn passed_event(node_id: &str) -> ReportEvent {
    ReportEvent::from_node_id(node_id, TestPhase::Teardown, RawOutcome::Passed)
}

/// Setup-stage event, used to register a test.
pub fn setup_event(node_id: &str) -> ReportEvent {
    ReportEvent::from_node_id(node_id, TestPhase::Setup, RawOutcome::Passed)
}
