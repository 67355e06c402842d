//! CLI command definitions for confpush
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod plans;
pub mod publish;
pub mod run;

use crate::config::Config;
use crate::format::{OutputFormat, Report};
use crate::publisher::PublishOptions;
use crate::vcs::GitBackend;
use clap::{Parser, Subcommand};
use plans::ShowArgs;
use publish::PublishArgs;
use run::{RunArgs, WriteArgs};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;

/// Overwrite project configuration files and publish them with git
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (skips project/user config discovery)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Working tree artifacts are written into (overrides config)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Exit with a non-zero status when publishing fails
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a plan's artifacts, then stage, commit and push
    Run(RunArgs),

    /// Write a plan's artifacts without publishing
    Write(WriteArgs),

    /// Stage, commit and push whatever is in the working tree
    Publish(PublishArgs),

    /// List configured plans
    Plans,

    /// Print the artifacts a plan would write, without touching disk
    Show(ShowArgs),
}

/// git backend configured from `config`, rooted at the publish root.
pub fn git_backend(config: &Config) -> GitBackend {
    GitBackend::new(&config.publish.root)
        .with_program(config.git.program.clone())
        .with_remote(config.git.remote.clone())
        .with_branch(config.git.branch.clone())
}

/// Publish options from config, widened by a command-line flag.
pub fn publish_options(config: &Config, allow_nothing_to_commit: bool) -> PublishOptions {
    PublishOptions {
        allow_nothing_to_commit: allow_nothing_to_commit
            || config.publish.allow_nothing_to_commit,
    }
}

/// Whether `report` should end the process with a failure status.
///
/// A failed publish is only fatal under `strict`; reports without a publish
/// result (`write`) never are.
pub fn fails_run(report: &Report, strict: bool) -> bool {
    match report.result {
        Some(ref result) => !result.succeeded && strict,
        None => false,
    }
}

/// Process exit status for a finished command.
pub fn exit_code(report: &Report, strict: bool) -> ExitCode {
    if fails_run(report, strict) {
        return ExitCode::FAILURE;
    }
    if report.result.as_ref().is_some_and(|r| !r.succeeded) {
        warn!("Publish did not complete; exiting 0 (use --strict to fail)");
    }
    ExitCode::SUCCESS
}
