//! File matching against rule patterns
//!
//! Only the immediate entries of a directory are considered. A pattern
//! matches when it is found anywhere in the base name, unless it anchors
//! itself with `^` / `$`.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{Result, SortError};

/// Compile a rule pattern
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| SortError::PatternInvalid {
        pattern: pattern.to_string(),
        source,
    })
}

/// Base name of a path as text, lossy for non-UTF-8 names
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Find the regular files directly inside `dir` whose name matches `pattern`.
///
/// Symlinks are followed: a link to a file counts, a link to a directory does
/// not. Results are sorted by file name.
pub fn find_matching(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let regex = compile_pattern(pattern)?;
    find_matching_regex(dir, &regex)
}

/// Same as [`find_matching`] with an already compiled pattern
pub fn find_matching_regex(dir: &Path, regex: &Regex) -> Result<Vec<PathBuf>> {
    let unreadable = |source| SortError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let entries = fs::read_dir(dir).map_err(unreadable)?;

    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry.map_err(unreadable)?;
        let path = entry.path();

        // Vanished or dangling entries report false here and are skipped
        if !path.is_file() {
            continue;
        }

        if regex.is_match(&base_name(&path)) {
            matches.push(path);
        }
    }

    matches.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    tracing::debug!(
        dir = %dir.display(),
        pattern = regex.as_str(),
        count = matches.len(),
        "Matched files"
    );

    Ok(matches)
}
