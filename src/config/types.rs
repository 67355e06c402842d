//! Configuration types and structures.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub publish: PublishConfig,

    #[serde(default)]
    pub git: GitConfig,

    /// Named plans, keyed by plan name.
    #[serde(default)]
    pub plans: BTreeMap<String, PlanConfig>,
}

/// Publisher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Working tree that artifact paths are relative to (default: `.`).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Treat "nothing to commit" as a no-op instead of a failure.
    #[serde(default)]
    pub allow_nothing_to_commit: bool,

    /// Exit non-zero when publishing fails.
    #[serde(default)]
    pub strict: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            allow_nothing_to_commit: false,
            strict: false,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// What `git add` stages before committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageMode {
    /// All working-tree changes.
    #[default]
    All,
    /// Only the files the plan writes.
    Artifacts,
}

/// git invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// git executable (default: `git`).
    #[serde(default = "default_git_program")]
    pub program: String,

    /// Explicit remote to push to. Unset pushes to the branch's upstream.
    #[serde(default)]
    pub remote: Option<String>,

    /// Refspec pushed to `remote`.
    #[serde(default)]
    pub branch: Option<String>,

    #[serde(default)]
    pub stage: StageMode,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: default_git_program(),
            remote: None,
            branch: None,
            stage: StageMode::default(),
        }
    }
}

fn default_git_program() -> String {
    "git".to_string()
}

/// A named artifact set plus the commit message that publishes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    #[serde(default)]
    pub description: Option<String>,

    pub commit_message: String,

    /// Overrides `git.stage` for this plan.
    #[serde(default)]
    pub stage: Option<StageMode>,

    #[serde(default)]
    pub artifacts: Vec<ArtifactConfig>,
}

impl PlanConfig {
    /// Check a single plan, named `name` in messages.
    pub fn validate(&self, name: &str) -> Result<()> {
        if self.commit_message.trim().is_empty() {
            bail!("plan '{}' has an empty commit_message", name);
        }
        if self.artifacts.is_empty() {
            bail!("plan '{}' lists no artifacts", name);
        }
        Ok(())
    }
}

/// One artifact entry: a target path and exactly one content source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawArtifactConfig")]
pub struct ArtifactConfig {
    pub path: String,

    #[serde(flatten)]
    pub source: ContentSource,
}

/// Artifact entry as written in YAML, before the source keys are checked.
#[derive(Deserialize)]
struct RawArtifactConfig {
    path: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    json: Option<serde_json::Value>,
    #[serde(default)]
    file: Option<PathBuf>,
}

impl TryFrom<RawArtifactConfig> for ArtifactConfig {
    type Error = String;

    fn try_from(raw: RawArtifactConfig) -> std::result::Result<Self, Self::Error> {
        let mut sources = Vec::new();
        if let Some(text) = raw.content {
            sources.push(ContentSource::Content(text));
        }
        if let Some(value) = raw.json {
            sources.push(ContentSource::Json(value));
        }
        if let Some(file) = raw.file {
            sources.push(ContentSource::File(file));
        }

        if sources.len() != 1 {
            return Err(format!(
                "artifact '{}' must set exactly one of content/json/file (found {})",
                raw.path,
                sources.len()
            ));
        }
        match sources.pop() {
            Some(source) => Ok(Self {
                path: raw.path,
                source,
            }),
            None => Err(format!("artifact '{}' has no content source", raw.path)),
        }
    }
}

/// Where an artifact's bytes come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    /// Literal text, written as-is.
    Content(String),
    /// Structured value, written as two-space-indented JSON.
    Json(serde_json::Value),
    /// Bytes copied from a file, relative to the publish root.
    File(PathBuf),
}

impl Config {
    /// Load configuration from a single file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Check every plan for obvious mistakes.
    pub fn validate(&self) -> Result<()> {
        for (name, plan) in &self.plans {
            plan.validate(name)?;
        }
        Ok(())
    }

    /// Plan names in sorted order.
    pub fn plan_names(&self) -> Vec<&str> {
        self.plans.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.publish.root, PathBuf::from("."));
        assert!(!config.publish.allow_nothing_to_commit);
        assert_eq!(config.git.program, "git");
        assert_eq!(config.git.stage, StageMode::All);
        assert!(config.plans.is_empty());
    }

    #[test]
    fn test_parse_plan_with_each_content_source() {
        let yaml = r#"
plans:
  render-docker:
    commit_message: "Fix: Update Dockerfile"
    stage: artifacts
    artifacts:
      - path: Dockerfile
        content: |
          FROM node:18-alpine
      - path: railway.json
        json:
          build:
            rootDirectory: server
      - path: server/package.json
        file: templates/server-package.json
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let plan = &config.plans["render-docker"];

        assert_eq!(plan.stage, Some(StageMode::Artifacts));
        assert_eq!(plan.artifacts.len(), 3);
        assert_eq!(
            plan.artifacts[0].source,
            ContentSource::Content("FROM node:18-alpine\n".to_string())
        );
        assert!(matches!(plan.artifacts[1].source, ContentSource::Json(_)));
        assert_eq!(
            plan.artifacts[2].source,
            ContentSource::File(PathBuf::from("templates/server-package.json"))
        );
    }

    #[test]
    fn test_artifact_with_two_sources_rejected() {
        let yaml = r#"
plans:
  fix-json:
    commit_message: "update"
    artifacts:
      - path: a.json
        content: "TEXT"
        json: { k: 1 }
"#;
        let err = serde_yaml::from_str::<Config>(yaml).unwrap_err();
        assert!(err.to_string().contains("exactly one of content/json/file"));
    }

    #[test]
    fn test_artifact_without_source_rejected() {
        let yaml = r#"
plans:
  fix-json:
    commit_message: "update"
    artifacts:
      - path: a.json
"#;
        let err = serde_yaml::from_str::<Config>(yaml).unwrap_err();
        assert!(err.to_string().contains("a.json"));
    }

    #[test]
    fn test_validate_rejects_empty_commit_message() {
        let yaml = r#"
plans:
  broken:
    commit_message: "  "
    artifacts:
      - path: a.json
        content: "{}"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_plan_without_artifacts() {
        let yaml = r#"
plans:
  empty:
    commit_message: "update"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no artifacts"));
    }
}
