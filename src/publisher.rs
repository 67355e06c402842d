//! The config publisher: write artifacts, then stage, commit and push.
//!
//! The publish pipeline is strictly linear. Each stage runs only when the
//! previous one succeeded, and nothing is rolled back: a failed push leaves
//! the local commit in place for a manual push later.

use crate::artifact::ArtifactSet;
use crate::error::{FailedStage, PublishError, Result};
use crate::vcs::VcsBackend;
use crate::writer::{self, WrittenArtifact};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of a publish or run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    pub succeeded: bool,
    pub failed_stage: FailedStage,
    pub message: String,
}

impl PublishResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            failed_stage: FailedStage::None,
            message: message.into(),
        }
    }

    pub fn failure(err: &PublishError) -> Self {
        Self {
            succeeded: false,
            failed_stage: err.failed_stage(),
            message: err.message(),
        }
    }
}

/// Knobs for the publish pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Treat "nothing to commit" as a no-op and still push.
    pub allow_nothing_to_commit: bool,
}

/// Writes artifacts under a root directory and publishes them through a
/// [`VcsBackend`].
///
/// Not safe to run concurrently against the same working tree; callers
/// serialize invocations.
#[derive(Debug)]
pub struct Publisher<B> {
    root: PathBuf,
    backend: B,
    options: PublishOptions,
}

impl<B: VcsBackend> Publisher<B> {
    pub fn new(root: impl Into<PathBuf>, backend: B) -> Self {
        Self {
            root: root.into(),
            backend,
            options: PublishOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PublishOptions) -> Self {
        self.options = options;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> PublishOptions {
        self.options
    }

    /// Overwrite every artifact under the root.
    pub fn write_artifacts(&self, artifacts: &ArtifactSet) -> Result<Vec<WrittenArtifact>> {
        writer::write_artifacts(&self.root, artifacts)
    }

    /// Stage, commit with `commit_message`, and push.
    ///
    /// Never fails past this boundary; the returned result names the stage
    /// that failed, if any, and carries the tool's error text.
    pub fn publish(&self, commit_message: &str) -> PublishResult {
        match self.try_publish(commit_message) {
            Ok(message) => {
                info!("Publish complete");
                PublishResult::success(message)
            }
            Err(err) => {
                warn!(
                    stage = %err.failed_stage(),
                    error = %err.message(),
                    "Publish failed; a manual publish may be required"
                );
                PublishResult::failure(&err)
            }
        }
    }

    /// Write `artifacts`, then publish. A write failure skips publishing
    /// entirely and is reported with `failed_stage = none`.
    pub fn run(&self, artifacts: &ArtifactSet, commit_message: &str) -> PublishResult {
        match self.write_artifacts(artifacts) {
            Ok(written) => {
                info!(count = written.len(), "Artifacts written");
                self.publish(commit_message)
            }
            Err(err) => {
                warn!(error = %err, "Artifact write failed; nothing was published");
                PublishResult::failure(&err)
            }
        }
    }

    fn try_publish(&self, commit_message: &str) -> Result<String> {
        self.backend
            .stage_all()
            .map_err(|f| PublishError::Stage(f.message))?;
        info!("Changes staged");

        let committed = match self.backend.commit(commit_message) {
            Ok(()) => {
                info!(message = %commit_message, "Changes committed");
                true
            }
            Err(f) if f.nothing_to_commit && self.options.allow_nothing_to_commit => {
                info!("Nothing to commit; pushing existing history");
                false
            }
            Err(f) => return Err(PublishError::Commit(f.message)),
        };

        self.backend
            .push()
            .map_err(|f| PublishError::Push(f.message))?;
        info!("Changes pushed");

        Ok(if committed {
            "committed and pushed".to_string()
        } else {
            "nothing to commit; pushed".to_string()
        })
    }
}
