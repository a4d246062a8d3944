//! Rename planning for episode files.
//!
//! A plan is computed purely from file names and episode metadata,
//! and applied separately so that it can be shown and confirmed first.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::tv_format::{Episode, SeasonEpisode, find_episode_by_number, parse_episode_file};

/// Maximum file name length in the short display form.
pub const SHORT_NAME_MAX_LEN: usize = 40;

/// A single planned rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathChange {
    pub old: PathBuf,
    pub new: PathBuf,
    pub is_file: bool,
}

/// A parsed file that has no matching episode in the season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedFile {
    pub path: PathBuf,
    pub season_episode: SeasonEpisode,
}

/// Ordered rename changes and the parsed files that could not be matched to an episode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub changes: Vec<PathChange>,
    pub unmatched: Vec<UnmatchedFile>,
}

impl PathChange {
    #[must_use]
    pub const fn new(old: PathBuf, new: PathBuf) -> Self {
        Self { old, new, is_file: true }
    }

    /// True when the file already has the target name.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.old == self.new
    }

    /// True when the old and new name only differ by letter case.
    #[must_use]
    pub fn is_case_change(&self) -> bool {
        !self.is_noop() && self.old_name().to_lowercase() == self.new_name().to_lowercase()
    }

    #[must_use]
    pub fn old_name(&self) -> String {
        crate::path_to_filename_string(&self.old)
    }

    #[must_use]
    pub fn new_name(&self) -> String {
        crate::path_to_filename_string(&self.new)
    }
}

impl fmt::Display for PathChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → {}",
            short_name(&self.old, SHORT_NAME_MAX_LEN).red(),
            short_name(&self.new, SHORT_NAME_MAX_LEN).green()
        )
    }
}

impl RenamePlan {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changes that would actually rename something.
    #[must_use]
    pub fn pending(&self) -> Vec<PathChange> {
        self.changes.iter().filter(|change| !change.is_noop()).cloned().collect()
    }
}

/// Build the rename plan for the given files.
///
/// Files without a season and episode marker are left out silently.
/// Files whose episode number is not in `episodes` are listed in [`RenamePlan::unmatched`].
/// The order of changes follows the order of `files`.
pub fn build_rename_plan<P: AsRef<Path>>(files: &[P], show_name: &str, episodes: &[Episode]) -> RenamePlan {
    let mut plan = RenamePlan::default();
    for file in files {
        let path = file.as_ref();
        let filename = crate::normalized_file_name(path);
        let Some(season_episode) = parse_episode_file(&filename) else {
            continue;
        };
        let Some(episode) = find_episode_by_number(episodes, season_episode.episode) else {
            plan.unmatched.push(UnmatchedFile {
                path: path.to_path_buf(),
                season_episode,
            });
            continue;
        };
        let new_name = format_filename(show_name, season_episode, &episode.name, &file_extension(&filename));
        plan.changes
            .push(PathChange::new(path.to_path_buf(), path.with_file_name(new_name)));
    }
    plan
}

/// Format the target file name: `<show> SxxEyy <episode><extension>`.
///
/// Colons are removed from the show name and path separators in both names
/// are replaced with a dash. The extension is expected to include the leading dot.
///
/// ```rust
/// use tvfmt::tv_format::{SeasonEpisode, format_filename};
///
/// let name = format_filename("Show: Title", SeasonEpisode::new(1, 5), "Pilot", ".mkv");
/// assert_eq!(name, "Show Title S01E05 Pilot.mkv");
/// ```
#[must_use]
pub fn format_filename(show_name: &str, season_episode: SeasonEpisode, episode_name: &str, extension: &str) -> String {
    let show_name = show_name.replace(':', "").replace(['/', '\\'], "-");
    let episode_name = episode_name.replace(['/', '\\'], "-");
    if episode_name.is_empty() {
        format!("{show_name} {season_episode}{extension}")
    } else {
        format!("{show_name} {season_episode} {episode_name}{extension}")
    }
}

/// Shorten a file name to at most `max_len` characters while keeping the extension visible.
#[must_use]
pub fn short_name(path: &Path, max_len: usize) -> String {
    let name = crate::path_to_filename_string(path);
    if name.chars().count() <= max_len {
        return name;
    }
    let marker = format!("[...]{}", file_extension(&name));
    let keep = max_len.saturating_sub(marker.chars().count());
    let mut short: String = name.chars().take(keep).collect();
    short.push_str(&marker);
    short
}

/// Apply the changes one by one in order.
///
/// No-op changes are skipped, and so are changes whose target already exists.
/// Stops at the first failing rename; earlier renames are kept.
/// Returns the number of renamed files.
///
/// # Errors
/// Returns an error if a file cannot be renamed.
pub fn apply_renames(changes: &[PathChange]) -> Result<usize> {
    let mut renamed = 0;
    for change in changes {
        if change.is_noop() {
            continue;
        }
        if change.new.exists() && !change.is_case_change() {
            crate::print_warning!("File already exists: {}", change.new_name());
            continue;
        }
        fs::rename(&change.old, &change.new).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                change.old.display(),
                change.new.display()
            )
        })?;
        renamed += 1;
    }
    Ok(renamed)
}

/// File extension including the leading dot, or an empty string.
fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .filter(|extension| !extension.is_empty())
        .map(|extension| format!(".{}", crate::os_str_to_string(extension)))
        .unwrap_or_default()
}
