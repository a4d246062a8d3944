pub mod config;
pub mod tv_format;

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Command;
use clap_complete::Shell;
use colored::{Color, ColoredString, Colorize};
use itertools::Itertools;
use unicode_normalization::UnicodeNormalization;
use walkdir::WalkDir;

/// Format bool value as a coloured string.
#[must_use]
pub fn colorize_bool(value: bool) -> ColoredString {
    if value { "true".green() } else { "false".red() }
}

/// Get the file name from a path with special characters retained instead of decomposed.
///
/// Paths use Unicode NFD on some platforms, which turns characters like "å" into
/// "a\u{30a}". Converting to NFC keeps the composed form.
#[must_use]
pub fn normalized_file_name(path: &Path) -> String {
    path_to_filename_string(path).nfc().collect::<String>()
}

/// Check if entry is a hidden file or directory (starts with '.')
#[must_use]
pub fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    let name_bytes = entry.file_name().as_encoded_bytes();
    !name_bytes.is_empty() && name_bytes[0] == b'.'
}

/// List the visible regular files directly inside a directory, sorted by path.
///
/// Hidden files and subdirectories are skipped.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn list_visible_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to read directory {}", dir.display()))?;
        if entry.file_type().is_file() && !is_hidden(&entry) {
            files.push(entry.into_path());
        }
    }
    files.sort_unstable();
    Ok(files)
}

/// Make a path absolute without requiring it to exist.
#[must_use]
pub fn absolute_path(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| {
        env::current_dir().map_or_else(|_| path.to_path_buf(), |current_dir| current_dir.join(path))
    })
}

/// Format a path for display with the home directory replaced by `~`.
#[must_use]
pub fn short_path(path: &Path) -> String {
    let path_string = path_to_string(path);
    match dirs::home_dir() {
        Some(home) => {
            let home_string = path_to_string(&home);
            if home_string.is_empty() {
                path_string
            } else {
                path_string.replacen(&home_string, "~", 1)
            }
        }
        None => path_string,
    }
}

/// Convert `OsStr` to String with invalid Unicode handling.
pub fn os_str_to_string(name: &OsStr) -> String {
    name.to_str().map_or_else(
        || name.to_string_lossy().replace('\u{FFFD}', ""),
        std::string::ToString::to_string,
    )
}

/// Convert given path to string with invalid Unicode handling.
pub fn path_to_string(path: &Path) -> String {
    path.to_str().map_or_else(
        || path.to_string_lossy().to_string().replace('\u{FFFD}', ""),
        std::string::ToString::to_string,
    )
}

/// Convert given path to filename string with invalid Unicode handling.
#[must_use]
pub fn path_to_filename_string(path: &Path) -> String {
    os_str_to_string(path.file_name().unwrap_or_default())
}

/// Turn an empty list into an error with the given message.
///
/// # Errors
/// Returns an error if `items` is empty.
pub fn non_empty<T>(items: Vec<T>, message: &'static str) -> Result<Vec<T>> {
    if items.is_empty() {
        anyhow::bail!(message);
    }
    Ok(items)
}

#[inline]
pub fn print_warning(message: &str) {
    eprintln!("{}", message.yellow());
}

#[macro_export]
macro_rules! print_warning {
    ($($arg:tt)*) => {
        $crate::print_warning(&format!($($arg)*))
    };
}

/// Draw text inside a box with a title in the top border.
///
/// The body may contain coloured text, escape codes are not counted towards the width.
#[must_use]
pub fn format_panel(title: &str, body: &str, color: Color) -> String {
    let lines: Vec<&str> = if body.is_empty() { vec![""] } else { body.lines().collect() };
    let title_width = visible_width(title);
    let inner_width = lines
        .iter()
        .map(|line| visible_width(line))
        .max()
        .unwrap_or_default()
        .max(title_width + 1);

    let top = format!(
        "{}{}{}",
        "╭─ ".color(color),
        title.color(color).bold(),
        format!(" {}╮", "─".repeat(inner_width + 2 - title_width - 3)).color(color)
    );
    let rows = lines.iter().map(|line| {
        format!(
            "{} {line}{} {}",
            "│".color(color),
            " ".repeat(inner_width - visible_width(line)),
            "│".color(color)
        )
    });
    let bottom = format!("╰{}╯", "─".repeat(inner_width + 2)).color(color).to_string();

    std::iter::once(top).chain(rows).chain(std::iter::once(bottom)).join("\n")
}

/// Print a titled panel to stdout.
pub fn print_panel(title: &str, body: &str, color: Color) {
    println!("{}", format_panel(title, body, color));
}

/// Print a red error panel to stderr.
pub fn print_error_panel(message: &str) {
    eprintln!("{}", format_panel("Error", message, Color::Red));
}

/// Number of visible characters in a string, ignoring ANSI escape sequences.
///
/// Counts `char`s, not terminal columns, so wide characters such as CJK or emoji
/// count as one and panels containing them are not aligned.
#[must_use]
pub fn visible_width(text: &str) -> usize {
    let mut width = 0;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            // Skip the control sequence up to and including the final letter.
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

/// Generate a shell completion script for the given shell.
///
/// # Errors
/// Returns an error if the completion file cannot be written.
pub fn generate_shell_completion(shell: Shell, mut command: Command, install: bool, command_name: &str) -> Result<()> {
    if install {
        let out_dir = get_shell_completion_dir(shell, command_name)?;
        let path = clap_complete::generate_to(shell, &mut command, command_name, out_dir)?;
        println!("Completion file generated to: {}", path.display());
    } else {
        clap_complete::generate(shell, &mut command, command_name, &mut std::io::stdout());
    }
    Ok(())
}

/// Determine the appropriate directory for storing shell completions.
///
/// First checks if the user-specific directory exists,
/// then checks for the global directory.
/// If neither exist, creates and uses the user-specific dir.
fn get_shell_completion_dir(shell: Shell, name: &str) -> Result<PathBuf> {
    let home = dirs::home_dir().context("Failed to get home directory")?;

    // Special handling for oh-my-zsh.
    // Create custom "plugin", which will then have to be loaded in .zshrc
    if shell == Shell::Zsh {
        let omz_plugins = home.join(".oh-my-zsh/custom/plugins");
        if omz_plugins.exists() {
            let plugin_dir = omz_plugins.join(name);
            std::fs::create_dir_all(&plugin_dir)?;
            return Ok(plugin_dir);
        }
    }

    let user_dir = match shell {
        Shell::PowerShell => {
            if cfg!(windows) {
                home.join(r"Documents\PowerShell\completions")
            } else {
                home.join(".config/powershell/completions")
            }
        }
        Shell::Bash => home.join(".bash_completion.d"),
        Shell::Elvish => home.join(".elvish"),
        Shell::Fish => home.join(".config/fish/completions"),
        Shell::Zsh => home.join(".zsh/completions"),
        _ => anyhow::bail!("Unsupported shell"),
    };

    if user_dir.exists() {
        return Ok(user_dir);
    }

    let global_dir = match shell {
        Shell::PowerShell => {
            if cfg!(windows) {
                home.join(r"Documents\PowerShell\completions")
            } else {
                home.join(".config/powershell/completions")
            }
        }
        Shell::Bash => PathBuf::from("/etc/bash_completion.d"),
        Shell::Fish => PathBuf::from("/usr/share/fish/completions"),
        Shell::Zsh => PathBuf::from("/usr/share/zsh/site-functions"),
        _ => anyhow::bail!("Unsupported shell"),
    };

    if global_dir.exists() {
        return Ok(global_dir);
    }

    std::fs::create_dir_all(&user_dir)?;
    Ok(user_dir)
}
