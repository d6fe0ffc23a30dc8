//! Run/test context shared across the agent's components
//!
//! The context is constructed once per process and handed to the reporter,
//! session manager and log buffer explicitly. The reporter is its only
//! mutator; everything else reads.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{AgentError, AgentResult};
use crate::types::{Test, TestRun};

/// In-memory state for the active run and the active test.
///
/// Locks guard single-field read-modify-write sections only; no lock is held
/// across an await point.
#[derive(Debug, Default)]
pub struct RunContext {
    test_run: RwLock<Option<TestRun>>,
    test: RwLock<Option<Test>>,
}

impl RunContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_test_run(&self, run: TestRun) {
        *self.test_run.write() = Some(run);
    }

    /// Record the remote id returned by a successful start-run call.
    pub fn assign_run_id(&self, id: u64) {
        if let Some(run) = self.test_run.write().as_mut() {
            run.reportal_id = Some(id);
        }
    }

    /// Join a run started by another worker process.
    pub fn adopt_run(&self, id: u64, name: impl Into<String>) {
        let mut run = TestRun::new(Some(name.into()), None, None);
        run.reportal_id = Some(id);
        *self.test_run.write() = Some(run);
    }

    pub fn test_run(&self) -> Option<TestRun> {
        self.test_run.read().clone()
    }

    pub fn set_test(&self, test: Test) {
        *self.test.write() = Some(test);
    }

    pub fn assign_test_id(&self, id: u64) {
        if let Some(test) = self.test.write().as_mut() {
            test.reportal_id = Some(id);
        }
    }

    pub fn mark_test_reverted(&self) {
        if let Some(test) = self.test.write().as_mut() {
            test.is_reverted = true;
        }
    }

    pub fn clear_test(&self) {
        *self.test.write() = None;
    }

    pub fn test(&self) -> Option<Test> {
        self.test.read().clone()
    }

    pub fn run_is_active(&self) -> bool {
        matches!(&*self.test_run.read(), Some(run) if run.reportal_id.is_some())
    }

    pub fn test_is_active(&self) -> bool {
        self.run_is_active()
            && matches!(&*self.test.read(), Some(test) if test.reportal_id.is_some())
    }

    pub fn test_is_reverted(&self) -> bool {
        matches!(&*self.test.read(), Some(test) if test.is_reverted)
    }

    /// Remote run id; call sites must check activity first.
    pub fn run_id(&self) -> AgentResult<u64> {
        self.test_run
            .read()
            .as_ref()
            .and_then(|run| run.reportal_id)
            .ok_or(AgentError::InactiveRun)
    }

    /// Remote test id; call sites must check activity first.
    pub fn test_id(&self) -> AgentResult<u64> {
        self.test
            .read()
            .as_ref()
            .and_then(|test| test.reportal_id)
            .ok_or(AgentError::InactiveTest)
    }
}
