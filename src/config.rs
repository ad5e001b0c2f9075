//! Configuration file handling.
//!
//! Reads from `~/.config/gratitude-journal/config.toml` unless another path
//! is given on the command line.

use crate::filter::SortOrder;
use color_eyre::eyre::{ContextCompat, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "gratitude-journal";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where entries are stored.
    pub data_file: PathBuf,
    /// Where tracing output goes; the terminal itself belongs to the UI.
    pub log_file: PathBuf,
    /// Sort order the entry list starts with.
    pub default_sort: SortOrder,
    /// Show the current streak in the status line at startup.
    pub show_streak_on_start: bool,
}

/// Whether `Config::load_from` read an existing file or wrote a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Created,
    Loaded,
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: data_dir().join("entries.json"),
            log_file: data_dir().join("journal.log"),
            default_sort: SortOrder::NewestFirst,
            show_streak_on_start: true,
        }
    }
}

impl Config {
    /// Default location of the config file.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join(APP_DIR).join("config.toml"))
    }

    /// Load configuration from `path`, writing a default file if there is
    /// none yet. Runs before logging is set up, so callers report the
    /// returned source themselves.
    pub fn load_from(path: &Path) -> Result<(Self, ConfigSource)> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok((config, ConfigSource::Created));
        }

        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok((config, ConfigSource::Loaded))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).wrap_err_with(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).wrap_err("Failed to serialize config")?;
        fs::write(path, contents)
            .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))
    }
}
