//! tvfmt - Rename TV episode files using episode titles from Trakt.
//!
//! Parses season and episode numbers from file names in a directory,
//! looks up the show, season, and episode titles from the Trakt API,
//! and renames the files to `<Show> SxxEyy <Episode title>.<ext>`.

mod config;
mod formatter;
mod provider;
mod select;
mod trakt;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use tvfmt::tv_format::ConfigKey;

use crate::config::Config;
use crate::formatter::TvFormatter;
use crate::select::TerminalSelector;
use crate::trakt::TraktClient;

/// Rename TV episode files using episode titles from Trakt.
#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Rename TV episode files using episode titles from Trakt"
)]
pub struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Generate shell completion
    #[arg(short = 'l', long, value_name = "SHELL")]
    completion: Option<Shell>,
}

#[derive(Subcommand)]
enum Command {
    /// Rename episode files in a directory
    #[command(name = "run")]
    Run(RunArgs),

    /// Show or edit the user config
    #[command(name = "config")]
    Config(ConfigArgs),
}

/// Arguments for the `run` command.
#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// Directory with episode files (default is the current directory)
    #[arg(value_hint = clap::ValueHint::DirPath)]
    path: Option<PathBuf>,

    /// Name of the TV show to search for
    #[arg(short = 's', long, value_name = "NAME")]
    show: Option<String>,

    /// Season number
    #[arg(short = 'n', long, value_name = "N")]
    season: Option<usize>,

    /// Auto-select the closest match to the given show name
    #[arg(short = 'a', long, overrides_with = "no_auto")]
    auto: bool,

    /// Always choose the show interactively
    #[arg(long, overrides_with = "auto")]
    no_auto: bool,

    /// Confirm changes before renaming files
    #[arg(short = 'c', long, overrides_with = "no_confirm")]
    confirm: bool,

    /// Rename files without asking for confirmation
    #[arg(long, overrides_with = "confirm")]
    no_confirm: bool,

    /// Trakt API key
    #[arg(short = 'k', long, value_name = "KEY")]
    api_key: Option<String>,

    /// Only print changes without renaming files
    #[arg(short = 'p', long)]
    print: bool,

    /// Print verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

/// Arguments for the `config` command.
#[derive(clap::Args, Debug, Default)]
pub struct ConfigArgs {
    /// Open the config file with the default application
    #[arg(short = 'o', long)]
    open: bool,

    /// Print the value of a config key
    #[arg(short = 'g', long, value_name = "KEY")]
    get: Option<ConfigKey>,

    /// Set a config key to the given value
    #[arg(short = 's', long, num_args = 2, value_names = ["KEY", "VALUE"])]
    set: Option<Vec<String>>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tvfmt::print_error_panel(&format!("{error:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    if let Some(shell) = args.completion {
        return tvfmt::generate_shell_completion(shell, Args::command(), true, env!("CARGO_BIN_NAME"));
    }

    match args.command {
        Some(Command::Run(run_args)) => {
            let config = Config::from_args(run_args)?;
            let client = TraktClient::new(&config.api_key, config.verbose)?;
            let selector = TerminalSelector::stdio();
            TvFormatter::new(client, selector, config).run().await
        }
        Some(Command::Config(config_args)) => config::config_command(&config_args),
        None => {
            Args::command().print_help()?;
            Ok(())
        }
    }
}
