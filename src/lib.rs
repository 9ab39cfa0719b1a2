//! qlvenv library — shared by the `qlvenv` and `ql-env2json` binaries.

pub mod cli;
pub mod commands;
pub mod config;
pub mod convert;
pub mod env;
pub mod envfile;
pub mod observability;
pub mod report;
pub mod runner;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::ManagerConfig;
use report::ConsoleReporter;
use runner::ProcessRunner;
use std::process::ExitCode;

/// Run the manager CLI — parses args and dispatches to command handlers.
/// Returns the process exit code; operation failures map to exit 1 without
/// an error backtrace, since the handlers already reported them.
pub fn run_cli() -> Result<ExitCode> {
    observability::init_tracing();
    let cli = Cli::parse();
    let cfg = ManagerConfig::from_env().with_cli_overrides(cli.scripts_dir, cli.repo_dir);
    let reporter = ConsoleReporter;
    let runner = ProcessRunner;

    let ok = match cli.command {
        Commands::Create { project, force } => {
            commands::create::cmd_create(&cfg, &runner, &reporter, &project, force)?
        }
        Commands::List => commands::list::cmd_list(&cfg, &runner, &reporter)?,
        Commands::Info { project } => {
            commands::info::cmd_info(&cfg, &runner, &reporter, &project)?
        }
        Commands::Remove { project } => {
            commands::remove::cmd_remove(&cfg, &runner, &reporter, &project)?
        }
        Commands::Activate { project } => {
            commands::activate::cmd_activate(&cfg, &reporter, &project)?
        }
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
