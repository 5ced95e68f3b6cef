use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single row of the rules table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Regular expression tested against file base names
    #[serde(rename = "regexp")]
    pub pattern: String,
    /// Directory that receives matching files (created on demand)
    #[serde(rename = "dist")]
    pub destination: PathBuf,
}

impl Rule {
    pub fn new(pattern: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            pattern: pattern.into(),
            destination: destination.into(),
        }
    }

    /// Whether both columns carry a value
    pub fn is_complete(&self) -> bool {
        !self.pattern.trim().is_empty() && !self.destination.to_string_lossy().trim().is_empty()
    }
}
