//! Output formatting for CLI reports, as plain text or JSON.

use crate::config::{Config, StageMode};
use crate::error::FailedStage;
use crate::plan::ResolvedPlan;
use crate::publisher::PublishResult;
use crate::writer::WrittenArtifact;
use clap::ValueEnum;
use serde::Serialize;
use std::path::PathBuf;

/// Output format for command reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Full report of a `run`, `write` or `publish` command.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    pub written: Vec<WrittenArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PublishResult>,
}

impl Report {
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.to_text(),
            OutputFormat::Json => to_json(self),
        }
    }

    fn to_text(&self) -> String {
        let mut out = String::new();

        if let Some(ref plan) = self.plan {
            out.push_str(&format!("Plan: {}\n", plan));
        }
        for written in &self.written {
            out.push_str(&format!(
                "Wrote {} ({} bytes)\n",
                written.path.display(),
                written.bytes
            ));
        }

        if let Some(ref result) = self.result {
            if result.succeeded {
                out.push_str(&format!("Published: {}\n", result.message));
            } else if result.failed_stage == FailedStage::None {
                out.push_str(&format!("Nothing published: {}\n", result.message));
            } else {
                out.push_str(&format!(
                    "Publish failed at {}: {}\n",
                    result.failed_stage, result.message
                ));
                out.push_str("You may need to publish manually.\n");
            }
        }

        out
    }
}

#[derive(Debug, Serialize)]
struct PlanSummary<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    commit_message: &'a str,
    artifacts: usize,
}

/// Render the configured plans.
pub fn format_plans(config: &Config, format: OutputFormat) -> String {
    let summaries: Vec<PlanSummary<'_>> = config
        .plans
        .iter()
        .map(|(name, plan)| PlanSummary {
            name,
            description: plan.description.as_deref(),
            commit_message: &plan.commit_message,
            artifacts: plan.artifacts.len(),
        })
        .collect();

    match format {
        OutputFormat::Json => to_json(&summaries),
        OutputFormat::Text => {
            if summaries.is_empty() {
                return "No plans configured.\n".to_string();
            }
            let mut out = format!("Plans ({})\n", summaries.len());
            for s in &summaries {
                out.push_str(&format!("  {} - {} artifact(s)", s.name, s.artifacts));
                if let Some(desc) = s.description {
                    out.push_str(&format!(": {}", desc));
                }
                out.push('\n');
            }
            out
        }
    }
}

#[derive(Debug, Serialize)]
struct ArtifactPreview {
    path: PathBuf,
    bytes: usize,
    content: String,
}

#[derive(Debug, Serialize)]
struct PlanPreview<'a> {
    name: &'a str,
    commit_message: &'a str,
    stage: StageMode,
    artifacts: Vec<ArtifactPreview>,
}

/// Render what a plan would write, content included.
pub fn format_plan(plan: &ResolvedPlan, format: OutputFormat) -> String {
    let preview = PlanPreview {
        name: &plan.name,
        commit_message: &plan.commit_message,
        stage: plan.stage,
        artifacts: plan
            .artifacts
            .iter()
            .map(|a| ArtifactPreview {
                path: a.path().to_path_buf(),
                bytes: a.len(),
                content: String::from_utf8_lossy(a.content()).to_string(),
            })
            .collect(),
    };

    match format {
        OutputFormat::Json => to_json(&preview),
        OutputFormat::Text => {
            let mut out = format!("# Plan: {}\n", preview.name);
            if let Some(ref desc) = plan.description {
                out.push_str(&format!("{}\n", desc));
            }
            out.push_str(&format!("Commit message: {}\n", preview.commit_message));
            for artifact in &preview.artifacts {
                out.push_str(&format!(
                    "\n## {} ({} bytes)\n{}\n",
                    artifact.path.display(),
                    artifact.bytes,
                    artifact.content
                ));
            }
            out
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    let mut json = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        serde_json::json!({ "error": format!("failed to encode report: {}", e) }).to_string()
    });
    json.push('\n');
    json
}
