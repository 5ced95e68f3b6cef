//! Append-only run log
//!
//! A `RunLog` is opened once at process start and handed to each stage of the
//! pipeline. Every event becomes one timestamped line in the log file, an
//! in-memory record, and a `tracing` event for the console.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{Result, SortError};

/// Severity of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Events recorded during a run
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    RuleFileLoaded {
        path: PathBuf,
        rule_count: usize,
        skipped_rows: usize,
    },
    RuleStart {
        index: usize,
        pattern: String,
        destination: PathBuf,
    },
    FilesFound {
        index: usize,
        count: usize,
    },
    NoMatch {
        index: usize,
    },
    FileMoved {
        source: PathBuf,
        destination: PathBuf,
    },
    FileMoveError {
        source: PathBuf,
        reason: String,
    },
    RuleSummary {
        index: usize,
        moved: usize,
    },
    RuleError {
        index: usize,
        error: String,
    },
    FatalError {
        error: String,
    },
}

impl LogEvent {
    pub fn severity(&self) -> Severity {
        match self {
            LogEvent::FileMoveError { .. } | LogEvent::RuleError { .. } | LogEvent::FatalError { .. } => {
                Severity::Error
            }
            _ => Severity::Info,
        }
    }

    /// Stable category name, used for filtering records
    pub fn category(&self) -> &'static str {
        match self {
            LogEvent::RuleFileLoaded { .. } => "rule-file-loaded",
            LogEvent::RuleStart { .. } => "rule-start",
            LogEvent::FilesFound { .. } => "files-found",
            LogEvent::NoMatch { .. } => "no-match",
            LogEvent::FileMoved { .. } => "file-moved",
            LogEvent::FileMoveError { .. } => "file-move-error",
            LogEvent::RuleSummary { .. } => "rule-summary",
            LogEvent::RuleError { .. } => "rule-error",
            LogEvent::FatalError { .. } => "fatal-error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            LogEvent::RuleFileLoaded {
                path,
                rule_count,
                skipped_rows,
            } => {
                if *skipped_rows > 0 {
                    format!(
                        "Loaded rule file {}: {} rules ({} incomplete rows skipped)",
                        path.display(),
                        rule_count,
                        skipped_rows
                    )
                } else {
                    format!("Loaded rule file {}: {} rules", path.display(), rule_count)
                }
            }
            LogEvent::RuleStart {
                index,
                pattern,
                destination,
            } => format!(
                "Rule {} started: pattern='{}', destination='{}'",
                index,
                pattern,
                destination.display()
            ),
            LogEvent::FilesFound { index, count } => {
                format!("Rule {} found {} files", index, count)
            }
            LogEvent::NoMatch { index } => format!("Rule {} matched no files", index),
            LogEvent::FileMoved {
                source,
                destination,
            } => format!("Moved file: {} -> {}", source.display(), destination.display()),
            LogEvent::FileMoveError { source, reason } => {
                format!("File move error: {} - {}", source.display(), reason)
            }
            LogEvent::RuleSummary { index, moved } => {
                format!("Rule {} moved {} files", index, moved)
            }
            LogEvent::RuleError { index, error } => format!("Rule {} failed: {}", index, error),
            LogEvent::FatalError { error } => {
                format!("An error occurred during processing: {}", error)
            }
        }
    }
}

/// One written log line
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub event: LogEvent,
}

impl LogRecord {
    /// Format as `2024-01-31 12:00:00,123 - INFO - message`
    pub fn to_line(&self) -> String {
        format!(
            "{} - {} - {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S,%3f"),
            self.event.severity(),
            self.event.message()
        )
    }
}

/// Run log with optional file output
pub struct RunLog {
    path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
    records: Vec<LogRecord>,
    write_failed: bool,
}

impl RunLog {
    /// Open (or create) a log file for appending, creating parent directories
    pub fn open(path: &Path) -> Result<Self> {
        let unavailable = |source| SortError::LogUnavailable {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(unavailable)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(unavailable)?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            writer: Some(BufWriter::new(file)),
            records: Vec::new(),
            write_failed: false,
        })
    }

    /// A log that only keeps records in memory and mirrors them to tracing
    pub fn in_memory() -> Self {
        Self {
            path: None,
            writer: None,
            records: Vec::new(),
            write_failed: false,
        }
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// Records of a single category, in write order
    pub fn records_in(&self, category: &str) -> Vec<&LogRecord> {
        self.records
            .iter()
            .filter(|r| r.event.category() == category)
            .collect()
    }

    /// Append an event
    pub fn record(&mut self, event: LogEvent) {
        let record = LogRecord {
            timestamp: Local::now(),
            event,
        };

        match record.event.severity() {
            Severity::Info => tracing::info!(category = record.event.category(), "{}", record.event.message()),
            Severity::Error => tracing::error!(category = record.event.category(), "{}", record.event.message()),
        }

        if let Some(writer) = self.writer.as_mut() {
            // Flush per line so an aborted run still leaves a complete log
            let result = writeln!(writer, "{}", record.to_line()).and_then(|_| writer.flush());
            if let Err(e) = result {
                if !self.write_failed {
                    tracing::warn!(
                        path = ?self.path,
                        "Failed to write to log file: {}",
                        e
                    );
                    self.write_failed = true;
                }
            }
        }

        self.records.push(record);
    }

    /// Flush and release the log file
    pub fn close(mut self) {
        self.flush();
        self.writer = None;
    }

    fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.flush() {
                tracing::warn!("Failed to flush log file: {}", e);
            }
        }
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        self.flush();
    }
}
