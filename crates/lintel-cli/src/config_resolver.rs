//! Configuration file lookup.
//!
//! The first match wins:
//!
//! 1. `--config` flag (or `LINTEL_CONFIG`)
//! 2. `lintel.toml` or `.lintel.toml` in the working directory or the
//!    nearest ancestor, without leaving the enclosing git checkout
//! 3. `config.toml` in the global directory (`~/.lintel/`)
//! 4. Built-in defaults
//!
//! Relative paths inside a project or explicit config, such as
//! `analyzer.root`, are taken relative to the directory holding the file.

use anyhow::{Context, Result};
use lintel_core::Config;
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order within a directory.
pub const PROJECT_CONFIG_NAMES: &[&str] = &["lintel.toml", ".lintel.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// A directory holding this entry is a checkout root; lookup stops there.
const CHECKOUT_MARKER: &str = ".git";

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line.
    Explicit(PathBuf),
    /// Found in the working directory or one of its ancestors.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Directory that relative paths in the configuration start from.
    ///
    /// `None` for global and default configurations, which apply to
    /// whatever directory lintel runs in.
    #[must_use]
    pub fn base_dir(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) => p.parent(),
            Self::Global(_) | Self::Default => None,
        }
    }

    /// Loads the configuration this source points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            tracing::debug!("No configuration file found, using defaults");
            return Ok(Config::default());
        };
        if let Self::Global(_) = self {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// Resolves the configuration for a run started in `working_dir`.
#[must_use]
pub fn resolve(working_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }
    find_project_config(working_dir)
        .map(ConfigSource::Project)
        .or_else(|| find_global_config(global_config_dir()?))
        .unwrap_or(ConfigSource::Default)
}

/// Searches `start` and its ancestors for a project config file.
fn find_project_config(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let found = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file());
        if let Some(path) = found {
            tracing::debug!("Found project config: {}", path.display());
            return Some(path);
        }
        if dir.join(CHECKOUT_MARKER).exists() {
            break;
        }
    }
    None
}

fn find_global_config(dir: PathBuf) -> Option<ConfigSource> {
    let candidate = dir.join(GLOBAL_CONFIG_NAME);
    if !candidate.is_file() {
        return None;
    }
    tracing::debug!("Found global config: {}", candidate.display());
    Some(ConfigSource::Global(candidate))
}

/// The global config directory: `$LINTEL_CONFIG_DIR`, else `~/.lintel/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("LINTEL_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".lintel"))
}
