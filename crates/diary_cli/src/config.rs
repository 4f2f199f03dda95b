//! CLI configuration.
//!
//! Loaded from a TOML file; every section falls back to defaults, then
//! `DIARY_DATA_PATH` / `DIARY_LOG_LEVEL` override the file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const DATA_PATH_ENV: &str = "DIARY_DATA_PATH";
pub const LOG_LEVEL_ENV: &str = "DIARY_LOG_LEVEL";
pub const DEFAULT_CONFIG_FILE: &str = "diary.toml";

/// Which entry backend the diary is stored in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Csv,
    Sqlite,
}

impl BackendKind {
    fn default_path(self) -> &'static str {
        match self {
            Self::Csv => "diary_entries.csv",
            Self::Sqlite => "diary.sqlite3",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: BackendKind,
    /// Unset means the backend's default file name in the working directory.
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn data_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.backend.default_path()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: diary_core::default_log_level().to_string(),
            dir: PathBuf::from("logs"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("reports"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiaryConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub export: ExportConfig,
}

impl DiaryConfig {
    /// Reads `path` and applies environment overrides. A missing file yields
    /// defaults; an unreadable or malformed one is an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = match fs::read_to_string(path) {
            Ok(raw) => toml::from_str(&raw)
                .with_context(|| format!("invalid config file `{}`", path.display()))?,
            Err(err) if err.kind() == ErrorKind::NotFound => Self::default(),
            Err(err) => {
                return Err(err).with_context(|| format!("cannot read `{}`", path.display()))
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies `DIARY_*` overrides looked up through `lookup`. Empty values
    /// are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(DATA_PATH_ENV).filter(|value| !value.is_empty()) {
            self.storage.path = Some(PathBuf::from(path));
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|value| !value.is_empty()) {
            self.logging.level = level;
        }
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("cannot write `{}`", path.display()))?;
        Ok(())
    }
}
