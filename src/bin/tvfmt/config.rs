//! Configuration module for tvfmt.
//!
//! Handles reading run settings from CLI arguments, the environment, and the user config file,
//! and implements the `config` command for viewing and editing the user config file.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use colored::{Color, Colorize};

use tvfmt::tv_format::{ConfigFile, ConfigKey, ConfigValue, TvfmtConfig};

use crate::{ConfigArgs, RunArgs};

/// Environment variable that overrides the API key from the config file.
pub const API_KEY_ENV: &str = "TRAKT_API_KEY";

/// Final config combined from CLI arguments, environment, and user config file.
#[derive(Debug)]
pub struct Config {
    /// Directory with the episode files.
    pub path: PathBuf,
    /// Show name to search for. Asked interactively when missing.
    pub show: Option<String>,
    /// One-based index into the season list.
    pub season: Option<usize>,
    /// Pick the first search result without asking.
    pub auto: bool,
    /// Ask before renaming.
    pub confirm: bool,
    /// Trakt API key.
    pub api_key: String,
    /// Only print changes.
    pub dryrun: bool,
    /// Verbose output.
    pub verbose: bool,
}

impl Config {
    /// Create config from given command line args, environment, and user config file.
    ///
    /// # Errors
    /// Returns an error if the config file is invalid or no API key is available.
    pub fn from_args(args: RunArgs) -> Result<Self> {
        let user_config = TvfmtConfig::get_user_config()?;
        let env_api_key = env::var(API_KEY_ENV).ok();
        Self::try_from_args(args, user_config, env_api_key)
    }

    /// Combine the given sources, with command line args taking priority.
    ///
    /// # Errors
    /// Returns an error if no API key is available.
    pub fn try_from_args(args: RunArgs, user_config: TvfmtConfig, env_api_key: Option<String>) -> Result<Self> {
        let api_key = resolve_api_key(args.api_key, env_api_key, user_config.trakt_api_key)
            .context("TRAKT_API_KEY not set in config or as an environment variable.")?;

        Ok(Self {
            path: args.path.unwrap_or_else(|| PathBuf::from(".")),
            show: args.show.map(|show| show.trim().to_string()).filter(|show| !show.is_empty()),
            season: args.season,
            auto: resolve_flag(args.auto, args.no_auto, user_config.auto),
            confirm: resolve_flag(args.confirm, args.no_confirm, user_config.confirm),
            api_key,
            dryrun: args.print,
            verbose: args.verbose,
        })
    }
}

/// Run the `config` command on the user config file.
///
/// # Errors
/// Returns an error if the config file cannot be read or written.
pub fn config_command(args: &ConfigArgs) -> Result<()> {
    let mut file = ConfigFile::open_default()?;
    if args.open {
        open_with_default_app(file.path())
    } else {
        edit_config(&mut file, args)
    }
}

/// Handle get, set, and show on an opened config file.
fn edit_config(file: &mut ConfigFile, args: &ConfigArgs) -> Result<()> {
    if let Some(key) = args.get {
        println!("{key} = {}", file.get(key)?);
    } else if let Some(pair) = &args.set {
        let [key, raw_value] = pair.as_slice() else {
            bail!("--set requires a KEY and a VALUE");
        };
        let key: ConfigKey = key.parse()?;
        match key.parse_value(raw_value) {
            Some(value) => {
                file.set(key, &value)?;
                println!("Set {key}: {value}");
            }
            None => println!("{}", format!("Config key '{key}' must be a boolean.").yellow()),
        }
    } else {
        let settings = file.settings()?;
        tvfmt::print_panel(&tvfmt::short_path(file.path()), &settings_display(&settings), Color::Yellow);
    }
    Ok(())
}

/// Settings as `key: value` lines with coloured flags.
fn settings_display(settings: &TvfmtConfig) -> String {
    ConfigKey::ALL
        .into_iter()
        .map(|key| match settings.get(key) {
            ConfigValue::Flag(flag) => format!("{key}: {}", tvfmt::colorize_bool(flag)),
            ConfigValue::Text(text) => format!("{key}: {text}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Open a file with the platform default application.
fn open_with_default_app(path: &Path) -> Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        Command::new("xdg-open")
    };
    command
        .arg(path)
        .spawn()
        .with_context(|| format!("Failed to open config file {}", path.display()))?;
    Ok(())
}

/// Pick the first non-empty API key: command line, then environment, then config file.
fn resolve_api_key(cli: Option<String>, env: Option<String>, file: String) -> Option<String> {
    [cli, env, Some(file)]
        .into_iter()
        .flatten()
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

/// A negating flag wins, then an enabling flag, then the config file value.
const fn resolve_flag(enable: bool, disable: bool, config_value: bool) -> bool {
    if disable { false } else { enable || config_value }
}
