//! Atomic, whole-file artifact writes.
//!
//! Each artifact is written to a temporary file in its target directory, synced,
//! then renamed over the target. Readers see either the old file or the new
//! one, never a truncated mix. Parent directories are never created: a missing
//! directory is reported as an error before anything in the set is written.

use crate::artifact::{Artifact, ArtifactSet};
use crate::error::{PublishError, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Confirmation of a single artifact write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenArtifact {
    /// Root-relative path of the written file.
    pub path: PathBuf,
    /// Number of bytes written.
    pub bytes: usize,
}

/// Write every artifact in `artifacts` under `root`, in order.
///
/// All parent directories are checked first so that a missing directory
/// aborts the set before any file is replaced.
pub fn write_artifacts(root: &Path, artifacts: &ArtifactSet) -> Result<Vec<WrittenArtifact>> {
    for artifact in artifacts {
        check_parent(root, artifact)?;
    }

    artifacts
        .iter()
        .map(|artifact| write_artifact(root, artifact))
        .collect()
}

/// Atomically replace a single artifact under `root`.
pub fn write_artifact(root: &Path, artifact: &Artifact) -> Result<WrittenArtifact> {
    let target = resolve_target(root, artifact)?;
    let parent = parent_dir(&target);

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| PublishError::io(&target, e))?;
    tmp.write_all(artifact.content())
        .map_err(|e| PublishError::io(&target, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| PublishError::io(&target, e))?;
    carry_permissions(&target, &tmp)?;

    tmp.persist(&target)
        .map_err(|e| PublishError::io(&target, e.error))?;

    info!(
        path = %artifact.path().display(),
        bytes = artifact.len(),
        "Artifact written"
    );

    Ok(WrittenArtifact {
        path: artifact.path().to_path_buf(),
        bytes: artifact.len(),
    })
}

fn check_parent(root: &Path, artifact: &Artifact) -> Result<()> {
    let target = resolve_target(root, artifact)?;
    let parent = parent_dir(&target);
    if parent.is_dir() {
        Ok(())
    } else {
        Err(PublishError::MissingParent {
            path: artifact.path().to_path_buf(),
            parent: parent.to_path_buf(),
        })
    }
}

/// Path to write for `artifact`.
///
/// A symlinked target is followed so the file it points at is replaced and
/// the link survives. The link must resolve inside `root`; a dangling link
/// is an I/O error.
fn resolve_target(root: &Path, artifact: &Artifact) -> Result<PathBuf> {
    let target = root.join(artifact.path());
    match std::fs::symlink_metadata(&target) {
        Ok(meta) if meta.file_type().is_symlink() => {}
        _ => return Ok(target),
    }

    let resolved = std::fs::canonicalize(&target).map_err(|e| PublishError::io(&target, e))?;
    let root = std::fs::canonicalize(root).map_err(|e| PublishError::io(root, e))?;
    if !resolved.starts_with(&root) {
        return Err(PublishError::invalid_path(
            artifact.path().display(),
            "symlink points outside the publish root",
        ));
    }

    debug!(
        path = %artifact.path().display(),
        resolved = %resolved.display(),
        "Following symlinked artifact"
    );
    Ok(resolved)
}

/// Directory containing `target`; `.` when `target` is a bare file name.
fn parent_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Give the temporary file the permissions of the file it replaces.
///
/// Temporary files are created owner-only; new targets get
/// [`new_file_permissions`] instead.
fn carry_permissions(target: &Path, tmp: &NamedTempFile) -> Result<()> {
    let permissions = match std::fs::metadata(target) {
        Ok(meta) => meta.permissions(),
        Err(_) => match new_file_permissions() {
            Some(permissions) => permissions,
            None => return Ok(()),
        },
    };

    debug!(path = %target.display(), "Applying target permissions to temporary file");
    tmp.as_file()
        .set_permissions(permissions)
        .map_err(|e| PublishError::io(target, e))
}

#[cfg(unix)]
fn new_file_permissions() -> Option<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<std::fs::Permissions> {
    None
}
