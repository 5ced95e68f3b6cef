//! Error types for a sorting run
//!
//! `SortError` covers everything that ends a run. Per-file move failures are
//! `FileMoveError` and are handled inside the mover without aborting.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a sorting run
#[derive(Debug, Error)]
pub enum SortError {
    /// The rules table does not exist
    #[error("Rule file not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    /// The rules table exists but cannot be read as a table with the required columns
    #[error("Rule file is malformed: {} ({reason})", .path.display())]
    ConfigMalformed { path: PathBuf, reason: String },

    /// A rule pattern failed to compile
    #[error("Invalid regular expression '{pattern}': {source}")]
    PatternInvalid {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The target directory cannot be listed
    #[error("Cannot read directory {}: {source}", .path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The log file cannot be opened for appending
    #[error("Cannot open log file {}: {source}", .path.display())]
    LogUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A setting has an unusable value
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

/// Failure to relocate a single file
#[derive(Debug, Clone, Error)]
#[error("Failed to move {} to {}: {reason}", .source_path.display(), .destination.display())]
pub struct FileMoveError {
    pub source_path: PathBuf,
    pub destination: PathBuf,
    pub reason: String,
}

impl FileMoveError {
    pub fn new(source_path: &Path, destination: &Path, reason: impl Into<String>) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            destination: destination.to_path_buf(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SortError>;
