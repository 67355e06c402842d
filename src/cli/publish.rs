//! `publish` subcommand: stage, commit and push without writing anything.

use super::{git_backend, publish_options};
use crate::config::Config;
use crate::format::Report;
use crate::publisher::Publisher;
use crate::vcs::VcsBackend;
use clap::Args;

/// Arguments for the publish subcommand
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Commit message
    #[arg(short, long)]
    pub message: String,

    /// Treat "nothing to commit" as success and still push
    #[arg(long)]
    pub allow_nothing_to_commit: bool,
}

/// Publish the working tree through git.
///
/// Always stages every change: without a plan there is no artifact list to
/// narrow the scope to.
pub fn publish_changes(config: &Config, args: &PublishArgs) -> Report {
    publish_with(config, args, git_backend(config))
}

pub fn publish_with<B: VcsBackend>(config: &Config, args: &PublishArgs, backend: B) -> Report {
    let publisher = Publisher::new(&config.publish.root, backend)
        .with_options(publish_options(config, args.allow_nothing_to_commit));
    Report {
        plan: None,
        written: Vec::new(),
        result: Some(publisher.publish(&args.message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailedStage;
    use crate::vcs::RecordingBackend;

    #[test]
    fn test_publish_stage_failure_skips_commit_and_push() {
        let backend = RecordingBackend::new().fail_stage("fatal: not a git repository");
        let args = PublishArgs {
            message: "update".to_string(),
            allow_nothing_to_commit: false,
        };

        let report = publish_with(&Config::default(), &args, &backend);

        let result = report.result.unwrap();
        assert_eq!(result.failed_stage, FailedStage::Stage);
        assert_eq!(result.message, "fatal: not a git repository");
        assert_eq!(backend.commit_calls(), 0);
        assert_eq!(backend.push_calls(), 0);
    }

    #[test]
    fn test_publish_flag_allows_nothing_to_commit() {
        let backend = RecordingBackend::new().nothing_to_commit("nothing to commit");
        let args = PublishArgs {
            message: "update".to_string(),
            allow_nothing_to_commit: true,
        };

        let report = publish_with(&Config::default(), &args, &backend);

        assert!(report.result.unwrap().succeeded);
        assert_eq!(backend.push_calls(), 1);
    }
}
