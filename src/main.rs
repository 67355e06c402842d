//! confpush
//!
//! Writes configured artifacts into a working tree and publishes them with git.

use anyhow::Result;
use clap::Parser;
use confpush::cli::plans::{list_plans, show_plan};
use confpush::cli::publish::publish_changes;
use confpush::cli::run::{run_plan, write_plan};
use confpush::cli::{Cli, Command, exit_code};
use confpush::config::ConfigLoader;
use confpush::logging::{self, LogTarget};
use std::process::ExitCode;
use tracing::debug;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut loader = match &cli.config {
        Some(path) => ConfigLoader::load_file(path)?,
        None => ConfigLoader::load()?,
    };
    for source in loader.sources() {
        debug!(path = %source.display(), "Using config file");
    }

    let config = loader.config_mut();
    if let Some(root) = &cli.root {
        config.publish.root = root.clone();
    }
    let strict = cli.strict || config.publish.strict;
    let config = loader.into_config();

    let report = match cli.command {
        Command::Run(args) => run_plan(&config, &args)?,
        Command::Write(args) => write_plan(&config, &args)?,
        Command::Publish(args) => publish_changes(&config, &args),
        Command::Plans => {
            print!("{}", list_plans(&config, cli.format));
            return Ok(ExitCode::SUCCESS);
        }
        Command::Show(args) => {
            print!("{}", show_plan(&config, &args, cli.format)?);
            return Ok(ExitCode::SUCCESS);
        }
    };

    print!("{}", report.render(cli.format));

    Ok(exit_code(&report, strict))
}
