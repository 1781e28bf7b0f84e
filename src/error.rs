// Error types for pdf-organize
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Invalid invocation or configuration, reported before any batch work.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to create output directory {path}: {source}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// A page whose text does not end in an `N/total` line.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("page has no text")]
    NoText,

    #[error("last text line has no '/' delimiter: {line:?}")]
    MissingDelimiter { line: String },

    #[error("text extraction failed: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Failure of a single file; never aborts sibling files.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("cannot open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("cannot rebuild page tree of {path}: {source}")]
    PageTree {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("output already exists: {0}")]
    AlreadyExists(PathBuf),
}

impl OrganizeError {
    /// True for failures on the destination side.
    pub fn is_write_error(&self) -> bool {
        matches!(
            self,
            OrganizeError::Write { .. } | OrganizeError::AlreadyExists(_)
        )
    }
}

/// Failures of the batch as a whole (not of an individual file).
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("cannot list {path}: {source}")]
    Discover {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot start worker runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("terminal error: {0}")]
    Terminal(#[source] io::Error),

    #[error("interrupted")]
    Interrupted,
}
