//! User config file for tvfmt.
//!
//! Settings live in the `[tvfmt]` section of the user config file.
//! Reading goes through `serde`, writing through `toml_edit` so that
//! comments and other sections in the file are kept as they are.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{fmt, io};

use anyhow::{Context, Result, anyhow, bail};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, de};
use toml_edit::{DocumentMut, Item, Table, value};

/// Name of the config file section.
const SECTION: &str = "tvfmt";

/// Keys that can be read and written with the `config` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    #[value(name = "trakt_api_key")]
    TraktApiKey,
    #[value(name = "auto")]
    Auto,
    #[value(name = "confirm")]
    Confirm,
}

/// A validated config value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Text(String),
    Flag(bool),
}

/// Config from the user config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TvfmtConfig {
    #[serde(default)]
    pub trakt_api_key: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub auto: bool,
    #[serde(default = "default_true", deserialize_with = "deserialize_flag")]
    pub confirm: bool,
}

/// Wrapper needed for parsing the config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    tvfmt: TvfmtConfig,
}

/// Editable user config file.
#[derive(Debug)]
pub struct ConfigFile {
    path: PathBuf,
    document: DocumentMut,
}

const fn default_true() -> bool {
    true
}

/// Accept a TOML boolean or a `"true"` / `"false"` string in any letter case.
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(flag) => Ok(flag),
        Flag::Text(text) => match text.trim().to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(de::Error::custom(format!("expected a boolean, got \"{text}\""))),
        },
    }
}

impl ConfigKey {
    pub const ALL: [Self; 3] = [Self::TraktApiKey, Self::Auto, Self::Confirm];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TraktApiKey => "trakt_api_key",
            Self::Auto => "auto",
            Self::Confirm => "confirm",
        }
    }

    /// True for keys that only accept `true` or `false`.
    #[must_use]
    pub const fn is_flag(self) -> bool {
        matches!(self, Self::Auto | Self::Confirm)
    }

    /// Validate a raw string value for this key.
    ///
    /// Flag keys accept `true` and `false` in any letter case.
    /// Returns `None` for an invalid value.
    #[must_use]
    pub fn parse_value(self, raw: &str) -> Option<ConfigValue> {
        if !self.is_flag() {
            return Some(ConfigValue::Text(raw.to_string()));
        }
        match raw.trim().to_lowercase().as_str() {
            "true" => Some(ConfigValue::Flag(true)),
            "false" => Some(ConfigValue::Flag(false)),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                anyhow!(
                    "Unknown config key '{name}', expected one of: {}",
                    Self::ALL.map(Self::as_str).join(", ")
                )
            })
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

impl Default for TvfmtConfig {
    fn default() -> Self {
        Self {
            trakt_api_key: String::new(),
            auto: false,
            confirm: true,
        }
    }
}

impl TvfmtConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    pub fn get_user_config() -> Result<Self> {
        let Some(path) = crate::config::config_path() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow!("Failed to read config file {}: {error}", path.display())),
        }
    }

    /// Parse config from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.tvfmt)
            .context("Failed to parse tvfmt config TOML")
    }

    /// Get the current value for a key.
    #[must_use]
    pub fn get(&self, key: ConfigKey) -> ConfigValue {
        match key {
            ConfigKey::TraktApiKey => ConfigValue::Text(self.trakt_api_key.clone()),
            ConfigKey::Auto => ConfigValue::Flag(self.auto),
            ConfigKey::Confirm => ConfigValue::Flag(self.confirm),
        }
    }
}

impl fmt::Display for TvfmtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = ConfigKey::ALL
            .into_iter()
            .map(|key| format!("{key}: {}", self.get(key)))
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

impl ConfigFile {
    /// Open the config file at the default location, creating it if needed.
    ///
    /// # Errors
    /// Returns an error if the home directory is unknown or the file cannot be read or created.
    pub fn open_default() -> Result<Self> {
        let path = crate::config::config_path().context("Failed to determine config file location")?;
        Self::open_or_create(path)
    }

    /// Open the config file, writing one with default values if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or created.
    pub fn open_or_create(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let document = content
                    .parse::<DocumentMut>()
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?;
                Ok(Self {
                    path: path.to_path_buf(),
                    document,
                })
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
                }
                let mut document = DocumentMut::new();
                document[SECTION] = Item::Table(default_section());
                let file = Self {
                    path: path.to_path_buf(),
                    document,
                };
                file.save()?;
                Ok(file)
            }
            Err(error) => Err(anyhow!("Failed to read config file {}: {error}", path.display())),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Typed settings from the current file contents.
    ///
    /// # Errors
    /// Returns an error if the `[tvfmt]` section has values of the wrong type.
    pub fn settings(&self) -> Result<TvfmtConfig> {
        TvfmtConfig::from_toml_str(&self.document.to_string())
            .with_context(|| format!("Invalid config file {}", self.path.display()))
    }

    /// Get the current value for a key.
    ///
    /// # Errors
    /// Returns an error if the config file contents are invalid.
    pub fn get(&self, key: ConfigKey) -> Result<ConfigValue> {
        Ok(self.settings()?.get(key))
    }

    /// Store a value and write the file.
    ///
    /// # Errors
    /// Returns an error if the value type does not match the key or the file cannot be written.
    pub fn set(&mut self, key: ConfigKey, config_value: &ConfigValue) -> Result<()> {
        let item = match (key.is_flag(), config_value) {
            (true, ConfigValue::Flag(flag)) => value(*flag),
            (false, ConfigValue::Text(text)) => value(text.as_str()),
            _ => bail!("Config key '{key}' does not accept value '{config_value}'"),
        };
        if self.document.get(SECTION).is_some_and(|section| !section.is_table_like()) {
            bail!("Config file section [{SECTION}] is not a table: {}", self.path.display());
        }
        if !self.document.contains_key(SECTION) {
            self.document[SECTION] = Item::Table(Table::new());
        }
        self.document[SECTION][key.as_str()] = item;
        self.save()
    }

    fn save(&self) -> Result<()> {
        fs::write(&self.path, self.document.to_string())
            .with_context(|| format!("Failed to write config file {}", self.path.display()))
    }
}

fn default_section() -> Table {
    let defaults = TvfmtConfig::default();
    let mut table = Table::new();
    table.insert(ConfigKey::TraktApiKey.as_str(), value(defaults.trakt_api_key));
    table.insert(ConfigKey::Auto.as_str(), value(defaults.auto));
    table.insert(ConfigKey::Confirm.as_str(), value(defaults.confirm));
    table
}
