//! TV episode file formatting.
//!
//! This module parses season and episode numbers from file names,
//! builds rename plans from episode metadata, and handles the user config file.

mod config;
mod models;
mod parse;
mod plan;

pub use config::{ConfigFile, ConfigKey, ConfigValue, TvfmtConfig};
pub use models::{Episode, Season, Show, find_episode_by_number};
pub use parse::{SeasonEpisode, parse_episode_file};
pub use plan::{
    PathChange, RenamePlan, SHORT_NAME_MAX_LEN, UnmatchedFile, apply_renames, build_rename_plan, format_filename,
    short_name,
};
