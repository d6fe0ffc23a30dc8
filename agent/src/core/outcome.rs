//! Status and reason resolution for finished tests

use shared::types::TestStatus;

use crate::types::{RawOutcome, ReportEvent, TestPhase};

/// Final status plus the human-readable reason shipped with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeResolution {
    pub status: TestStatus,
    pub reason: Option<String>,
}

/// Apply the agent's status precedence to a teardown-stage report event.
///
/// Precedence: a pass wins outright; a skip decided at setup or an expected
/// failure maps to SKIPPED; everything else is FAILED. An expected failure
/// reports SKIPPED even when the host outcome was not a skip.
pub fn resolve_outcome(event: &ReportEvent) -> OutcomeResolution {
    let is_setup_skip = event.phase == TestPhase::Setup && event.outcome == RawOutcome::Skipped;
    let is_xfail = event.xfail_reason.is_some();

    let status = if event.outcome == RawOutcome::Passed {
        TestStatus::Passed
    } else if is_setup_skip || is_xfail {
        TestStatus::Skipped
    } else {
        TestStatus::Failed
    };

    let reason = if is_xfail && status != TestStatus::Passed {
        event.xfail_reason.clone()
    } else if is_setup_skip {
        event
            .skip_reason
            .clone()
            .or_else(|| event.failure.as_ref().map(|f| f.representation.clone()))
    } else {
        event.failure.as_ref().map(|failure| match &failure.message {
            // Structured exception chain: prepend the crash message.
            Some(message) => format!("{message}\n\n{}", failure.representation),
            None => failure.representation.clone(),
        })
    };

    OutcomeResolution { status, reason }
}
