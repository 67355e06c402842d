//! confpush library
//!
//! Overwrites a fixed set of project files from declarative plans and
//! publishes the result with a stage → commit → push pipeline.

pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod plan;
pub mod publisher;
pub mod vcs;
pub mod writer;

pub use artifact::{Artifact, ArtifactSet};
pub use error::{FailedStage, PublishError};
pub use publisher::{PublishOptions, PublishResult, Publisher};
pub use vcs::{GitBackend, RecordingBackend, VcsBackend};
