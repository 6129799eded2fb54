//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use datamirror_core::script::DEFAULT_SCRIPT_NAME;

/// Mirror a manifest's remote files into a local data directory.
///
/// `fetch` downloads the files, `script` writes an equivalent wget script,
/// and `check` reports which targets of such a script already exist.
#[derive(Parser, Debug)]
#[command(name = "datamirror")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download every manifest URL into the data directory
    Fetch(FetchArgs),
    /// Write a wget script that downloads the manifest URLs
    Script(ScriptArgs),
    /// Report which targets of a download script exist on disk
    Check(CheckArgs),
}

/// Options shared by commands that map manifest URLs to local paths.
#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    /// Manifest file (YAML, or JSON with a .json extension)
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Local data directory (overrides data_dir in the config file)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// URL path prefix removed before mapping into the data directory
    #[arg(short, long)]
    pub trim_prefix: Option<String>,

    /// Only keep paths starting with this prefix (repeatable, comma-separated)
    #[arg(short, long = "include-prefix", value_name = "PREFIX")]
    pub include_prefix: Vec<String>,
}

/// Arguments for `fetch`.
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,

    /// Maximum concurrent downloads (1-256, default 8)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..=256))]
    pub workers: Option<u16>,

    /// Maximum attempts per file, including the first (1-20, default 5)
    #[arg(short = 'a', long, value_parser = clap::value_parser!(u32).range(1..=20))]
    pub max_attempts: Option<u32>,
}

/// Arguments for `script`.
#[derive(Args, Debug, Clone)]
pub struct ScriptArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,

    /// Output script path
    #[arg(short, long, default_value = DEFAULT_SCRIPT_NAME)]
    pub out: PathBuf,
}

/// Arguments for `check`.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Download script to inspect
    #[arg(short, long)]
    pub script: PathBuf,

    /// Data directory (otherwise $DATA_DIR, otherwise the script's DATA_DIR=)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Only check targets starting with this prefix (repeatable, comma-separated)
    #[arg(short, long = "include-prefix", value_name = "PREFIX")]
    pub include_prefix: Vec<String>,

    /// Also list every existing target
    #[arg(long)]
    pub show_existing: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}
