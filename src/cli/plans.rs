//! `plans` and `show` subcommands.

use crate::config::Config;
use crate::format::{OutputFormat, format_plan, format_plans};
use crate::plan::resolve_plan;
use anyhow::Result;
use clap::Args;
use tracing::warn;

/// Arguments for the show subcommand
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Name of the plan to display
    #[arg(value_name = "PLAN")]
    pub plan: String,
}

/// List configured plans, warning about any that would fail to run.
pub fn list_plans(config: &Config, format: OutputFormat) -> String {
    for (name, plan) in &config.plans {
        if let Err(e) = plan.validate(name) {
            warn!(plan = %name, "{}", e);
        }
    }
    format_plans(config, format)
}

/// Resolve a plan and render its artifacts without writing them.
pub fn show_plan(config: &Config, args: &ShowArgs, format: OutputFormat) -> Result<String> {
    let plan = resolve_plan(config, &args.plan, &config.publish.root)?;
    Ok(format_plan(&plan, format))
}
