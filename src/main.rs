//! CLI entry point for the datamirror tool.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

mod app;
mod cli;

use cli::Cli;

/// Process outcome categories and their exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    Success,
    Failure,
    InputNotFound,
    DataRootUnresolved,
    DiscoveryEmpty,
    DiscoveryEmptyAfterFilter,
    Incomplete,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::InputNotFound => 2,
            Self::DataRootUnresolved => 3,
            Self::DiscoveryEmpty => 4,
            Self::DiscoveryEmptyAfterFilter => 5,
            Self::Incomplete => 6,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        ExitCode::from(exit.code())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    app::terminal::init_tracing(
        app::terminal::default_log_level(cli.verbose, cli.quiet),
        app::terminal::no_color_requested(),
    );
    debug!(?cli, "CLI arguments parsed");

    match app::run(cli).await {
        Ok(exit) => exit.into(),
        Err(error) => {
            eprintln!("Error: {error:#}");
            app::exit_handler::exit_for_error(&error).into()
        }
    }
}
