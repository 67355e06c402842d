//! Scripted in-memory backend that records every call.

use super::{VcsBackend, VcsFailure, VcsResult};
use std::cell::RefCell;

/// A call made against a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    StageAll,
    Commit(String),
    Push,
}

/// Backend that never touches a repository.
///
/// Each operation returns a preconfigured outcome (success by default) and
/// is appended to the call log, so tests can assert both what happened and
/// what was skipped.
#[derive(Debug)]
pub struct RecordingBackend {
    calls: RefCell<Vec<VcsCall>>,
    stage: VcsResult,
    commit: VcsResult,
    push: VcsResult,
}

impl RecordingBackend {
    /// Backend where every stage succeeds.
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            stage: Ok(()),
            commit: Ok(()),
            push: Ok(()),
        }
    }

    pub fn fail_stage(mut self, message: impl Into<String>) -> Self {
        self.stage = Err(VcsFailure::new(message));
        self
    }

    pub fn fail_commit(mut self, message: impl Into<String>) -> Self {
        self.commit = Err(VcsFailure::new(message));
        self
    }

    /// Commit fails the way git does on a clean index.
    pub fn nothing_to_commit(mut self, message: impl Into<String>) -> Self {
        self.commit = Err(VcsFailure::nothing_to_commit(message));
        self
    }

    pub fn fail_push(mut self, message: impl Into<String>) -> Self {
        self.push = Err(VcsFailure::new(message));
        self
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<VcsCall> {
        self.calls.borrow().clone()
    }

    pub fn stage_calls(&self) -> usize {
        self.count(|c| matches!(c, VcsCall::StageAll))
    }

    pub fn commit_calls(&self) -> usize {
        self.count(|c| matches!(c, VcsCall::Commit(_)))
    }

    pub fn push_calls(&self) -> usize {
        self.count(|c| matches!(c, VcsCall::Push))
    }

    fn count(&self, pred: impl Fn(&VcsCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: VcsCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl VcsBackend for RecordingBackend {
    fn stage_all(&self) -> VcsResult {
        self.record(VcsCall::StageAll);
        self.stage.clone()
    }

    fn commit(&self, message: &str) -> VcsResult {
        self.record(VcsCall::Commit(message.to_string()));
        self.commit.clone()
    }

    fn push(&self) -> VcsResult {
        self.record(VcsCall::Push);
        self.push.clone()
    }
}
