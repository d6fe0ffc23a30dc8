//! Agent-internal data types

use std::path::PathBuf;

use chrono::Utc;

/// Separator between the source file segment and the test path segments in a
/// host-framework node id, e.g. `tests/checkout.rs::cart::test_totals`.
pub const NODE_ID_SEPARATOR: &str = "::";

/// The one run this process reports into.
#[derive(Debug, Clone)]
pub struct TestRun {
    pub name: String,
    pub environment: Option<String>,
    pub build: Option<String>,
    /// Assigned once the start-run call succeeds; the run is inactive until then.
    pub reportal_id: Option<u64>,
}

impl TestRun {
    pub fn new(name: Option<String>, environment: Option<String>, build: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_else(|| format!("Unnamed {}", Utc::now())),
            environment,
            build,
            reportal_id: None,
        }
    }
}

/// The test currently in flight.
#[derive(Debug, Clone)]
pub struct Test {
    pub name: String,
    pub file: String,
    pub maintainers: Vec<String>,
    pub labels: Vec<(String, String)>,
    pub reportal_id: Option<u64>,
    /// Set by an explicit registration revert; suppresses the finish call.
    pub is_reverted: bool,
}

impl Test {
    pub fn new(
        name: impl Into<String>,
        file: impl Into<String>,
        maintainers: Vec<String>,
        labels: Vec<(String, String)>,
    ) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            maintainers,
            labels,
            reportal_id: None,
            is_reverted: false,
        }
    }
}

/// One open automation session tracked by the session manager.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub session_id: String,
    /// Absent when the run was not active at registration time; the session
    /// then lives on unregistered remotely.
    pub reportal_session_id: Option<String>,
    pub related_tests: Vec<u64>,
}

/// Which host-framework hook produced a report event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestPhase {
    Setup,
    Call,
    Teardown,
}

/// Outcome as reported by the host framework, before the agent applies its
/// own status precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawOutcome {
    Passed,
    Failed,
    Skipped,
}

/// Failure description attached to a report event.
#[derive(Debug, Clone)]
pub struct FailureDetails {
    /// Crash message of a structured exception chain; absent when the host
    /// only has a plain-text representation.
    pub message: Option<String>,
    pub representation: String,
}

impl FailureDetails {
    pub fn text(representation: impl Into<String>) -> Self {
        Self { message: None, representation: representation.into() }
    }

    pub fn chain(message: impl Into<String>, representation: impl Into<String>) -> Self {
        Self { message: Some(message.into()), representation: representation.into() }
    }
}

/// External test-case-management references carried on a report event.
#[derive(Debug, Clone, Default)]
pub struct TcmRefs {
    pub test_rail_case_ids: Vec<String>,
    pub xray_test_keys: Vec<String>,
    pub zephyr_test_case_keys: Vec<String>,
}

impl TcmRefs {
    pub fn is_empty(&self) -> bool {
        self.test_rail_case_ids.is_empty()
            && self.xray_test_keys.is_empty()
            && self.zephyr_test_case_keys.is_empty()
    }
}

/// Structured lifecycle event assembled by the host integration layer.
///
/// The agent never introspects test-declaration syntax; everything it needs
/// arrives on this payload.
#[derive(Debug, Clone)]
pub struct ReportEvent {
    pub name: String,
    pub file: String,
    pub phase: TestPhase,
    pub outcome: RawOutcome,
    pub maintainers: Vec<String>,
    pub labels: Vec<(String, String)>,
    pub artifact_references: Vec<(String, String)>,
    pub artifacts: Vec<PathBuf>,
    pub xfail_reason: Option<String>,
    pub skip_reason: Option<String>,
    pub failure: Option<FailureDetails>,
    pub tcm_refs: TcmRefs,
    /// Pre-assigned remote id, present only when rerun filtering matched this
    /// test against a prior run.
    pub reportal_id: Option<u64>,
}

impl ReportEvent {
    pub fn new(
        name: impl Into<String>,
        file: impl Into<String>,
        phase: TestPhase,
        outcome: RawOutcome,
    ) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            phase,
            outcome,
            maintainers: Vec::new(),
            labels: Vec::new(),
            artifact_references: Vec::new(),
            artifacts: Vec::new(),
            xfail_reason: None,
            skip_reason: None,
            failure: None,
            tcm_refs: TcmRefs::default(),
            reportal_id: None,
        }
    }

    /// Split a `file::module::test` node id into file and dotted test name.
    pub fn from_node_id(node_id: &str, phase: TestPhase, outcome: RawOutcome) -> Self {
        let mut segments = node_id.split(NODE_ID_SEPARATOR);
        let file = segments.next().unwrap_or_default().to_string();
        let name = segments.collect::<Vec<_>>().join(".");
        Self::new(name, file, phase, outcome)
    }
}

/// Collected-test identity passed through `filter_test_items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestItem {
    pub name: String,
    pub file: String,
    /// Annotated by rerun filtering so `start_test` updates instead of creates.
    pub reportal_id: Option<u64>,
}

impl TestItem {
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self { name: name.into(), file: file.into(), reportal_id: None }
    }
}
