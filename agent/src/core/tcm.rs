//! Test-case-management label vocabularies
//!
//! External TCM systems (TestRail, Xray, Zephyr) are mirrored through
//! well-known labels the reporting service interprets server-side. The agent
//! only ever attaches labels; it never talks to the TCM systems directly.

use shared::messages::LabelPayload;

use crate::types::TcmRefs;

pub mod test_rail {
    pub const SYNC_ENABLED: &str = "com.reportal.app/tcm.testrail.sync.enabled";
    pub const SYNC_REAL_TIME: &str = "com.reportal.app/tcm.testrail.sync.real-time";
    pub const INCLUDE_ALL: &str = "com.reportal.app/tcm.testrail.include-all-cases";
    pub const SUITE_ID: &str = "com.reportal.app/tcm.testrail.suite-id";
    pub const RUN_ID: &str = "com.reportal.app/tcm.testrail.run-id";
    pub const RUN_NAME: &str = "com.reportal.app/tcm.testrail.run-name";
    pub const MILESTONE: &str = "com.reportal.app/tcm.testrail.milestone";
    pub const ASSIGNEE: &str = "com.reportal.app/tcm.testrail.assignee";
    pub const CASE_ID: &str = "com.reportal.app/tcm.testrail.case-id";
}

pub mod xray {
    pub const SYNC_ENABLED: &str = "com.reportal.app/tcm.xray.sync.enabled";
    pub const SYNC_REAL_TIME: &str = "com.reportal.app/tcm.xray.sync.real-time";
    pub const EXECUTION_KEY: &str = "com.reportal.app/tcm.xray.test-execution-key";
    pub const TEST_KEY: &str = "com.reportal.app/tcm.xray.test-key";
}

pub mod zephyr {
    pub const SYNC_ENABLED: &str = "com.reportal.app/tcm.zephyr.sync.enabled";
    pub const SYNC_REAL_TIME: &str = "com.reportal.app/tcm.zephyr.sync.real-time";
    pub const TEST_CYCLE_KEY: &str = "com.reportal.app/tcm.zephyr.test-cycle-key";
    pub const JIRA_PROJECT_KEY: &str = "com.reportal.app/tcm.zephyr.jira-project-key";
    pub const TEST_CASE_KEY: &str = "com.reportal.app/tcm.zephyr.test-case-key";
}

/// Locale label attached at run scope.
pub const SUT_LOCALE: &str = "com.reportal.app/sut.locale";

/// Expand the case ids carried on a report event into their label form, one
/// label per case id, preserving the order they were attached in.
pub fn case_labels(refs: &TcmRefs) -> Vec<LabelPayload> {
    let mut labels = Vec::new();
    for case_id in &refs.test_rail_case_ids {
        labels.push(LabelPayload::new(test_rail::CASE_ID, case_id));
    }
    for test_key in &refs.xray_test_keys {
        labels.push(LabelPayload::new(xray::TEST_KEY, test_key));
    }
    for case_key in &refs.zephyr_test_case_keys {
        labels.push(LabelPayload::new(zephyr::TEST_CASE_KEY, case_key));
    }
    labels
}
