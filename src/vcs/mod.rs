//! Version-control backends.
//!
//! The publisher only needs three operations, run in a fixed order:
//! stage everything, commit with a message, push. [`VcsBackend`] captures
//! exactly that so git can be swapped for a scripted fake in tests.

mod git;
mod recording;

pub use git::{CommandCapture, GitBackend, StageScope};
pub use recording::{RecordingBackend, VcsCall};

use std::fmt;

/// Failure reported by a backend operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsFailure {
    /// Tool output explaining the failure, verbatim.
    pub message: String,
    /// Commit failed only because the index had no changes.
    pub nothing_to_commit: bool,
}

impl VcsFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            nothing_to_commit: false,
        }
    }

    pub fn nothing_to_commit(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            nothing_to_commit: true,
        }
    }
}

impl fmt::Display for VcsFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for VcsFailure {}

/// Result type for backend operations.
pub type VcsResult = Result<(), VcsFailure>;

/// The stage → commit → push capability the publisher drives.
///
/// Every call blocks until the underlying tool has finished.
pub trait VcsBackend {
    /// Mark working-tree changes for the next commit.
    fn stage_all(&self) -> VcsResult;

    /// Commit staged changes with `message`.
    fn commit(&self, message: &str) -> VcsResult;

    /// Push to the remote tracked by the current branch.
    fn push(&self) -> VcsResult;
}

impl<B: VcsBackend + ?Sized> VcsBackend for &B {
    fn stage_all(&self) -> VcsResult {
        (**self).stage_all()
    }

    fn commit(&self, message: &str) -> VcsResult {
        (**self).commit(message)
    }

    fn push(&self) -> VcsResult {
        (**self).push()
    }
}

impl<B: VcsBackend + ?Sized> VcsBackend for Box<B> {
    fn stage_all(&self) -> VcsResult {
        (**self).stage_all()
    }

    fn commit(&self, message: &str) -> VcsResult {
        (**self).commit(message)
    }

    fn push(&self) -> VcsResult {
        (**self).push()
    }
}
