//! Turning a configured plan into an artifact set.

use crate::artifact::{Artifact, ArtifactSet};
use crate::config::{ArtifactConfig, Config, ContentSource, StageMode};
use crate::error::{PublishError, Result};
use crate::vcs::StageScope;
use std::path::Path;

/// A plan ready to hand to the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlan {
    pub name: String,
    pub description: Option<String>,
    pub commit_message: String,
    pub stage: StageMode,
    pub artifacts: ArtifactSet,
}

impl ResolvedPlan {
    /// git staging scope for this plan.
    pub fn stage_scope(&self) -> StageScope {
        match self.stage {
            StageMode::All => StageScope::All,
            StageMode::Artifacts => StageScope::Paths(self.artifacts.paths()),
        }
    }
}

/// Look up plan `name` and load its artifacts.
///
/// `file:` sources are read relative to `root`.
pub fn resolve_plan(config: &Config, name: &str, root: &Path) -> Result<ResolvedPlan> {
    let plan = config.plans.get(name).ok_or_else(|| {
        let available = config.plan_names();
        if available.is_empty() {
            PublishError::config(format!("unknown plan '{}' (no plans configured)", name))
        } else {
            PublishError::config(format!(
                "unknown plan '{}' (available: {})",
                name,
                available.join(", ")
            ))
        }
    })?;
    plan.validate(name)
        .map_err(|e| PublishError::config(e.to_string()))?;

    let artifacts = plan
        .artifacts
        .iter()
        .map(|entry| resolve_artifact(entry, root))
        .collect::<Result<ArtifactSet>>()?;

    Ok(ResolvedPlan {
        name: name.to_string(),
        description: plan.description.clone(),
        commit_message: plan.commit_message.clone(),
        stage: plan.stage.unwrap_or(config.git.stage),
        artifacts,
    })
}

fn resolve_artifact(entry: &ArtifactConfig, root: &Path) -> Result<Artifact> {
    match entry.source {
        ContentSource::Content(ref text) => Artifact::text(&entry.path, text.as_str()),
        ContentSource::Json(ref value) => Artifact::json(&entry.path, value),
        ContentSource::File(ref source) => {
            let source = root.join(source);
            let bytes = std::fs::read(&source).map_err(|e| PublishError::io(&source, e))?;
            Artifact::new(&entry.path, bytes)
        }
    }
}
