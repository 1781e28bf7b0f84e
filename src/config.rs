// Configuration for pdf-organize: CLI values layered over env and config.toml
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::FallbackLabel;

pub const APP_DIR: &str = "pdf-organize";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_EXTENSION: &str = ".pdf";
pub const DEFAULT_LOG_LEVEL: &str = "warn";
pub const JOBS_ENV: &str = "PDF_ORGANIZE_JOBS";

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub jobs: Option<usize>,
    pub fallback: Option<FallbackLabel>,
    pub extension: Option<String>,
    pub log_level: Option<String>,
    pub overwrite: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Explicit path must exist; the per-user file is optional.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// `<config dir>/pdf-organize/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE_NAME))
}

/// Values taken from the command line; `None` defers to env/file/default.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub directory: PathBuf,
    pub output: PathBuf,
    pub jobs: Option<usize>,
    pub fallback: Option<FallbackLabel>,
    pub log_file: Option<PathBuf>,
    pub verbose: u8,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub directory: PathBuf,
    pub output: PathBuf,
    /// `None` means one worker per file, all started at once.
    pub jobs: Option<NonZeroUsize>,
    pub fallback: FallbackLabel,
    pub extension: String,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub overwrite: bool,
}

impl Settings {
    /// Precedence: CLI, then `PDF_ORGANIZE_JOBS`, then the config file.
    pub fn resolve(cli: CliOverrides, file: FileConfig) -> Result<Self, ConfigError> {
        let env_jobs = match env::var(JOBS_ENV) {
            Ok(value) => Some(value.trim().parse::<usize>().map_err(|e| {
                ConfigError::InvalidValue {
                    key: JOBS_ENV,
                    reason: format!("{value:?}: {e}"),
                }
            })?),
            Err(_) => None,
        };

        let jobs = match cli.jobs.or(env_jobs).or(file.jobs) {
            Some(n) => Some(NonZeroUsize::new(n).ok_or(ConfigError::InvalidValue {
                key: "jobs",
                reason: "must be at least 1".to_string(),
            })?),
            None => None,
        };

        let extension = file
            .extension
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
        if extension.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "extension",
                reason: "must not be empty".to_string(),
            });
        }

        let log_level = match cli.verbose {
            0 => file
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            1 => "info".to_string(),
            _ => "debug".to_string(),
        };

        Ok(Self {
            directory: cli.directory,
            output: cli.output,
            jobs,
            fallback: cli.fallback.or(file.fallback).unwrap_or_default(),
            extension,
            log_level,
            log_file: cli.log_file,
            overwrite: file.overwrite.unwrap_or(true),
        })
    }

    /// Checks the source directory and creates the output directory.
    /// Returns true when the output directory had to be created.
    pub fn prepare_directories(&self) -> Result<bool, ConfigError> {
        if !self.directory.exists() {
            return Err(ConfigError::MissingDirectory(self.directory.clone()));
        }
        if !self.directory.is_dir() {
            return Err(ConfigError::NotADirectory(self.directory.clone()));
        }
        if self.output.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(&self.output).map_err(|source| ConfigError::CreateOutput {
            path: self.output.clone(),
            source,
        })?;
        Ok(true)
    }
}
