//! Structured error types for artifact writes and publishing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Pipeline stage reported in a [`PublishResult`](crate::publisher::PublishResult).
///
/// `None` covers both a fully successful publish and failures that happen
/// before any version-control stage runs (artifact writes, configuration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStage {
    #[default]
    None,
    Stage,
    Commit,
    Push,
}

impl FailedStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailedStage::None => "none",
            FailedStage::Stage => "stage",
            FailedStage::Commit => "commit",
            FailedStage::Push => "push",
        }
    }
}

impl fmt::Display for FailedStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while writing artifacts or running the publish pipeline.
#[derive(Debug, Error)]
pub enum PublishError {
    /// An artifact could not be written (permissions, disk full, ...).
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory an artifact should land in does not exist.
    #[error("cannot write {}: parent directory {} does not exist", path.display(), parent.display())]
    MissingParent { path: PathBuf, parent: PathBuf },

    /// Artifact path is absolute, empty, or climbs above the root.
    #[error("invalid artifact path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Artifact content could not be encoded.
    #[error("failed to encode content for '{path}': {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// `stage all` failed.
    #[error("stage failed: {0}")]
    Stage(String),

    /// `commit` failed (nothing to commit, identity not configured, hooks...).
    #[error("commit failed: {0}")]
    Commit(String),

    /// `push` failed (no upstream, auth, network, non-fast-forward...).
    #[error("push failed: {0}")]
    Push(String),

    /// Plan or configuration problem.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PublishError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn invalid_path(path: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Stage this error maps to in a publish result.
    pub fn failed_stage(&self) -> FailedStage {
        match self {
            PublishError::Stage(_) => FailedStage::Stage,
            PublishError::Commit(_) => FailedStage::Commit,
            PublishError::Push(_) => FailedStage::Push,
            _ => FailedStage::None,
        }
    }

    /// Message suitable for a publish result.
    ///
    /// Version-control failures yield the tool's text verbatim; everything
    /// else yields the full display string.
    pub fn message(&self) -> String {
        match self {
            PublishError::Stage(msg) | PublishError::Commit(msg) | PublishError::Push(msg) => {
                msg.clone()
            }
            other => other.to_string(),
        }
    }
}

/// Result type for publisher operations.
pub type Result<T> = std::result::Result<T, PublishError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vcs_errors_map_to_stages() {
        assert_eq!(
            PublishError::Stage("x".into()).failed_stage(),
            FailedStage::Stage
        );
        assert_eq!(
            PublishError::Commit("x".into()).failed_stage(),
            FailedStage::Commit
        );
        assert_eq!(
            PublishError::Push("x".into()).failed_stage(),
            FailedStage::Push
        );
        let io = PublishError::io(
            "a.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(io.failed_stage(), FailedStage::None);
    }

    #[test]
    fn test_vcs_message_is_verbatim() {
        let err = PublishError::Push("no upstream".into());
        assert_eq!(err.message(), "no upstream");
        assert_eq!(err.to_string(), "push failed: no upstream");
    }

    #[test]
    fn test_io_message_names_path() {
        let err = PublishError::io(
            "server/package.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.message().contains("server/package.json"));
        assert!(err.message().contains("denied"));
    }

    #[test]
    fn test_failed_stage_serializes_snake_case() {
        let json = serde_json::to_string(&FailedStage::Push).unwrap();
        assert_eq!(json, "\"push\"");
        assert_eq!(FailedStage::default(), FailedStage::None);
    }
}
