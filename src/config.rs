//! Run settings
//!
//! Settings come from the process environment, optionally seeded from a
//! `.env` file. Anything unset falls back to a platform default.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, SortError};

pub const ENV_RULES_FILE: &str = "RULE_SORTER_RULES";
pub const ENV_TARGET_DIR: &str = "RULE_SORTER_TARGET";
pub const ENV_LOG_FILE: &str = "RULE_SORTER_LOG";
pub const ENV_ON_RULE_ERROR: &str = "RULE_SORTER_ON_RULE_ERROR";

const DEFAULT_RULES_FILE: &str = "rules.csv";
const DEFAULT_LOG_FILE: &str = "file_transfer.log";
const APP_DIR: &str = "rule-sorter";

/// What to do when a rule's pattern is invalid or the target cannot be listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleErrorPolicy {
    /// End the run at the first failing rule
    #[default]
    Abort,
    /// Log the failure and continue with the next rule
    Skip,
}

impl FromStr for RuleErrorPolicy {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(RuleErrorPolicy::Abort),
            "skip" => Ok(RuleErrorPolicy::Skip),
            other => Err(SortError::ConfigError {
                message: format!(
                    "{} must be 'abort' or 'skip', got '{}'",
                    ENV_ON_RULE_ERROR, other
                ),
            }),
        }
    }
}

/// Immutable settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// CSV rules table
    pub rules_file: PathBuf,
    /// Directory whose immediate files are sorted
    pub target_dir: PathBuf,
    /// Append-only run log
    pub log_file: PathBuf,
    pub on_rule_error: RuleErrorPolicy,
}

impl Settings {
    pub fn new(
        rules_file: impl Into<PathBuf>,
        target_dir: impl Into<PathBuf>,
        log_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            rules_file: rules_file.into(),
            target_dir: target_dir.into(),
            log_file: log_file.into(),
            on_rule_error: RuleErrorPolicy::Abort,
        }
    }

    pub fn with_rule_error_policy(mut self, policy: RuleErrorPolicy) -> Self {
        self.on_rule_error = policy;
        self
    }

    /// Load settings from the environment, reading `.env` first if present
    pub fn from_env() -> Result<Self> {
        // A missing .env is normal
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let rules_file = value(ENV_RULES_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RULES_FILE));
        let target_dir = value(ENV_TARGET_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_target_dir);
        let log_file = value(ENV_LOG_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(default_log_file);
        let on_rule_error = match value(ENV_ON_RULE_ERROR) {
            Some(v) => v.parse()?,
            None => RuleErrorPolicy::default(),
        };

        Ok(Self {
            rules_file,
            target_dir,
            log_file,
            on_rule_error,
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_file
    }
}

/// The user's downloads folder, or the working directory
fn default_target_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_log_file() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR).join(DEFAULT_LOG_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(settings.rules_file, PathBuf::from("rules.csv"));
        assert_eq!(settings.target_dir, default_target_dir());
        assert!(settings.log_file.ends_with("file_transfer.log"));
        assert_eq!(settings.on_rule_error, RuleErrorPolicy::Abort);
    }

    #[test]
    fn test_values_from_lookup() {
        let settings = Settings::from_lookup(lookup_from(&[
            (ENV_RULES_FILE, "/etc/sorter/rules.csv"),
            (ENV_TARGET_DIR, "/srv/inbox"),
            (ENV_LOG_FILE, "/tmp/sorter.log"),
            (ENV_ON_RULE_ERROR, "Skip"),
        ]))
        .unwrap();

        assert_eq!(settings.rules_file, PathBuf::from("/etc/sorter/rules.csv"));
        assert_eq!(settings.target_dir, PathBuf::from("/srv/inbox"));
        assert_eq!(settings.log_path(), Path::new("/tmp/sorter.log"));
        assert_eq!(settings.on_rule_error, RuleErrorPolicy::Skip);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[(ENV_RULES_FILE, "  ")])).unwrap();
        assert_eq!(settings.rules_file, PathBuf::from("rules.csv"));
    }

    #[test]
    fn test_invalid_policy() {
        let result = Settings::from_lookup(lookup_from(&[(ENV_ON_RULE_ERROR, "retry")]));
        assert!(matches!(result, Err(SortError::ConfigError { .. })));
    }

    #[test]
    fn test_with_rule_error_policy() {
        let settings = Settings::new("r.csv", "in", "run.log").with_rule_error_policy(RuleErrorPolicy::Skip);
        assert_eq!(settings.on_rule_error, RuleErrorPolicy::Skip);
    }
}
