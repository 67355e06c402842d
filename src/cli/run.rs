//! `run` and `write` subcommands.

use super::{git_backend, publish_options};
use crate::config::Config;
use crate::error::FailedStage;
use crate::format::Report;
use crate::plan::{ResolvedPlan, resolve_plan};
use crate::publisher::Publisher;
use crate::vcs::VcsBackend;
use crate::writer::WrittenArtifact;
use anyhow::Result;
use clap::Args;
use tracing::info;

/// Arguments for the run subcommand
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Name of the plan to apply
    #[arg(value_name = "PLAN")]
    pub plan: String,

    /// Commit message (default: the plan's commit_message)
    #[arg(short, long)]
    pub message: Option<String>,

    /// Treat "nothing to commit" as success and still push
    #[arg(long)]
    pub allow_nothing_to_commit: bool,
}

/// Arguments for the write subcommand
#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Name of the plan whose artifacts to write
    #[arg(value_name = "PLAN")]
    pub plan: String,
}

/// Resolve the plan, write it and publish through git.
pub fn run_plan(config: &Config, args: &RunArgs) -> Result<Report> {
    let plan = resolve_plan(config, &args.plan, &config.publish.root)?;
    let backend = git_backend(config).with_stage_scope(plan.stage_scope());
    Ok(run_plan_with(config, &plan, args, backend))
}

/// Write and publish `plan` through `backend`.
pub fn run_plan_with<B: VcsBackend>(
    config: &Config,
    plan: &ResolvedPlan,
    args: &RunArgs,
    backend: B,
) -> Report {
    let message = args.message.as_deref().unwrap_or(&plan.commit_message);
    info!(plan = %plan.name, artifacts = plan.artifacts.len(), "Applying plan");

    let publisher = Publisher::new(&config.publish.root, backend)
        .with_options(publish_options(config, args.allow_nothing_to_commit));
    let result = publisher.run(&plan.artifacts, message);

    // Artifacts were written unless the failure happened before any stage.
    let wrote = result.succeeded || result.failed_stage != FailedStage::None;
    let written = if wrote {
        plan.artifacts
            .iter()
            .map(|a| WrittenArtifact {
                path: a.path().to_path_buf(),
                bytes: a.len(),
            })
            .collect()
    } else {
        Vec::new()
    };

    Report {
        plan: Some(plan.name.clone()),
        written,
        result: Some(result),
    }
}

/// Resolve the plan and write its artifacts. Write failures are errors.
pub fn write_plan(config: &Config, args: &WriteArgs) -> Result<Report> {
    let plan = resolve_plan(config, &args.plan, &config.publish.root)?;
    let written = crate::writer::write_artifacts(&config.publish.root, &plan.artifacts)?;
    Ok(Report {
        plan: Some(plan.name),
        written,
        result: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::RecordingBackend;
    use tempfile::TempDir;

    fn config_in(root: &std::path::Path) -> Config {
        let yaml = r#"
plans:
  fix-json:
    commit_message: "Fix: clean JSON files"
    artifacts:
      - path: package.json
        json: { name: signature-seal-fullstack, version: "1.0.0" }
      - path: server/package.json
        json: { name: server, main: src/index.js }
"#;
        let mut config: Config = serde_yaml::from_str(yaml).unwrap();
        config.publish.root = root.to_path_buf();
        config
    }

    fn args(plan: &str) -> RunArgs {
        RunArgs {
            plan: plan.to_string(),
            message: None,
            allow_nothing_to_commit: false,
        }
    }

    #[test]
    fn test_run_uses_plan_commit_message() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("server")).unwrap();
        let config = config_in(temp.path());
        let plan = resolve_plan(&config, "fix-json", temp.path()).unwrap();
        let backend = RecordingBackend::new();

        let report = run_plan_with(&config, &plan, &args("fix-json"), &backend);

        let result = report.result.unwrap();
        assert!(result.succeeded);
        assert_eq!(report.written.len(), 2);
        assert_eq!(backend.commit_calls(), 1);
        assert!(
            backend
                .calls()
                .contains(&crate::vcs::VcsCall::Commit("Fix: clean JSON files".to_string()))
        );
    }

    #[test]
    fn test_run_message_override() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("server")).unwrap();
        let config = config_in(temp.path());
        let plan = resolve_plan(&config, "fix-json", temp.path()).unwrap();
        let backend = RecordingBackend::new();
        let mut run_args = args("fix-json");
        run_args.message = Some("custom".to_string());

        run_plan_with(&config, &plan, &run_args, &backend);

        assert!(
            backend
                .calls()
                .contains(&crate::vcs::VcsCall::Commit("custom".to_string()))
        );
    }

    #[test]
    fn test_run_write_failure_reports_nothing_written() {
        let temp = TempDir::new().unwrap();
        // No server/ directory.
        let config = config_in(temp.path());
        let plan = resolve_plan(&config, "fix-json", temp.path()).unwrap();
        let backend = RecordingBackend::new();

        let report = run_plan_with(&config, &plan, &args("fix-json"), &backend);

        let result = report.result.unwrap();
        assert!(!result.succeeded);
        assert_eq!(result.failed_stage, FailedStage::None);
        assert!(report.written.is_empty());
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_write_plan_writes_without_publishing() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("server")).unwrap();
        let config = config_in(temp.path());

        let report = write_plan(
            &config,
            &WriteArgs {
                plan: "fix-json".to_string(),
            },
        )
        .unwrap();

        assert!(report.result.is_none());
        let server = std::fs::read_to_string(temp.path().join("server/package.json")).unwrap();
        assert!(server.contains("\"main\": \"src/index.js\""));
    }
}
