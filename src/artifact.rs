//! Artifacts: whole-file replacements addressed by a root-relative path.
//!
//! An [`Artifact`] never patches a file. Whatever it holds becomes the entire
//! content of the target on the next write. Paths are validated once, at
//! construction, so everything downstream can join them onto the publisher
//! root without re-checking.

use crate::error::{PublishError, Result};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// A single file's target path and full content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    path: PathBuf,
    content: Vec<u8>,
}

impl Artifact {
    /// Create an artifact from raw bytes.
    pub fn new(path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Result<Self> {
        Ok(Self {
            path: normalize_relative(path.as_ref())?,
            content: content.into(),
        })
    }

    /// Create an artifact from text.
    pub fn text(path: impl AsRef<Path>, content: impl Into<String>) -> Result<Self> {
        Self::new(path, content.into().into_bytes())
    }

    /// Create an artifact holding `value` as pretty JSON with two-space
    /// indentation and no trailing newline.
    pub fn json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<Self> {
        let path = path.as_ref();
        let rendered = serde_json::to_string_pretty(value).map_err(|source| PublishError::Encode {
            path: path.display().to_string(),
            source,
        })?;
        Self::text(path, rendered)
    }

    /// Root-relative, normalized target path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Ordered artifacts. Order only affects log output; each write is independent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
    }

    /// Builder-style push.
    pub fn with(mut self, artifact: Artifact) -> Self {
        self.push(artifact);
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Artifact> {
        self.artifacts.iter()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Target paths in processing order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.artifacts.iter().map(|a| a.path.clone()).collect()
    }
}

impl FromIterator<Artifact> for ArtifactSet {
    fn from_iter<I: IntoIterator<Item = Artifact>>(iter: I) -> Self {
        Self {
            artifacts: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ArtifactSet {
    type Item = &'a Artifact;
    type IntoIter = std::slice::Iter<'a, Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.iter()
    }
}

impl IntoIterator for ArtifactSet {
    type Item = Artifact;
    type IntoIter = std::vec::IntoIter<Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.into_iter()
    }
}

/// Normalize a relative path without touching the filesystem.
///
/// Drops `.` components and resolves `..` against earlier components.
/// Rejects absolute paths, drive prefixes, empty paths and anything that
/// would resolve above the root.
pub fn normalize_relative(path: &Path) -> Result<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                return Err(PublishError::invalid_path(path.display(), "path must be relative"));
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(PublishError::invalid_path(
                        path.display(),
                        "path escapes the publish root",
                    ));
                }
            }
            Component::Normal(name) => parts.push(name),
        }
    }

    if parts.is_empty() {
        return Err(PublishError::invalid_path(path.display(), "path names no file"));
    }

    Ok(parts.iter().collect())
}
