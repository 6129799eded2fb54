//! Command dispatch for the binary.

use std::io::IsTerminal;

use anyhow::Result;

use crate::ProcessExit;
use crate::cli::{Cli, Command};

pub(crate) mod check;
pub(crate) mod config;
pub(crate) mod exit_handler;
pub(crate) mod fetch;
pub(crate) mod script;
pub(crate) mod settings;
pub(crate) mod terminal;

/// Runs the selected subcommand and returns its exit category.
pub(crate) async fn run(cli: Cli) -> Result<ProcessExit> {
    let file_config = config::load_default_file_config()?;
    let show_progress = terminal::should_show_progress(
        std::io::stderr().is_terminal(),
        cli.quiet,
        terminal::is_dumb_terminal(),
    );

    match cli.command {
        Command::Fetch(args) => fetch::run_fetch(&args, file_config.as_ref(), show_progress).await,
        Command::Script(args) => script::run_script(&args, file_config.as_ref()),
        Command::Check(args) => check::run_check(&args, file_config.as_ref()),
    }
}
