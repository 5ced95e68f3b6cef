//! Batch mover
//!
//! Moves one rule's batch of files into its destination. A failure on one
//! file is logged and the rest of the batch still runs.

use std::path::{Path, PathBuf};

use crate::error::FileMoveError;
use crate::logging::{LogEvent, RunLog};
use crate::matcher::base_name;

use super::io::{ensure_directory, relocate_file};

/// Result of moving one batch
#[derive(Debug, Clone, Default)]
pub struct MoveReport {
    /// Base names of moved files, in processing order
    pub moved: Vec<String>,
    pub failed: Vec<FileMoveError>,
}

impl MoveReport {
    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Move `files` into `destination`, returning the base names that moved
pub fn move_files(files: &[PathBuf], destination: &Path, log: &mut RunLog) -> Vec<String> {
    move_batch(files, destination, log).moved
}

/// Move `files` into `destination`, reporting successes and failures
pub fn move_batch(files: &[PathBuf], destination: &Path, log: &mut RunLog) -> MoveReport {
    let mut report = MoveReport::default();

    if let Err(e) = ensure_directory(destination) {
        let reason = format!("Failed to create destination {}: {}", destination.display(), e);
        for file in files {
            log.record(LogEvent::FileMoveError {
                source: file.clone(),
                reason: reason.clone(),
            });
            report
                .failed
                .push(FileMoveError::new(file, destination, reason.clone()));
        }
        return report;
    }

    for file in files {
        match relocate_file(file, destination) {
            Ok(new_path) => {
                log.record(LogEvent::FileMoved {
                    source: file.clone(),
                    destination: new_path,
                });
                report.moved.push(base_name(file));
            }
            Err(err) => {
                log.record(LogEvent::FileMoveError {
                    source: file.clone(),
                    reason: err.reason.clone(),
                });
                report.failed.push(err);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_moves_all_files() {
        let dir = tempdir().unwrap();
        let files: Vec<PathBuf> = ["a.txt", "b.txt"]
            .iter()
            .map(|n| {
                let p = dir.path().join(n);
                fs::write(&p, n).unwrap();
                p
            })
            .collect();
        let dest = dir.path().join("out").join("text");
        let mut log = RunLog::in_memory();

        let moved = move_files(&files, &dest, &mut log);

        assert_eq!(moved, vec!["a.txt", "b.txt"]);
        assert!(dest.join("a.txt").exists());
        assert!(dest.join("b.txt").exists());
        assert_eq!(log.records_in("file-moved").len(), 2);
    }

    #[test]
    fn test_existing_destination_twice() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("fresh");
        let mut log = RunLog::in_memory();

        let first = dir.path().join("one.txt");
        fs::write(&first, "1").unwrap();
        assert_eq!(move_files(&[first], &dest, &mut log), vec!["one.txt"]);

        let second = dir.path().join("two.txt");
        fs::write(&second, "2").unwrap();
        assert_eq!(move_files(&[second], &dest, &mut log), vec!["two.txt"]);

        assert!(log.records_in("file-move-error").is_empty());
    }

    #[test]
    fn test_one_failure_does_not_stop_batch() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let vanished = dir.path().join("vanished.txt");
        let c = dir.path().join("c.txt");
        fs::write(&a, "a").unwrap();
        fs::write(&c, "c").unwrap();
        let dest = dir.path().join("out");
        let mut log = RunLog::in_memory();

        let report = move_batch(&[a, vanished.clone(), c], &dest, &mut log);

        assert_eq!(report.moved, vec!["a.txt", "c.txt"]);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.failed[0].source_path, vanished);
        assert_eq!(log.records_in("file-move-error").len(), 1);
        assert_eq!(log.records_in("file-moved").len(), 2);
    }

    #[test]
    fn test_existing_name_is_replaced() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out");
        fs::create_dir(&dest).unwrap();
        fs::write(dest.join("dup.txt"), "existing").unwrap();
        let dup = dir.path().join("dup.txt");
        let other = dir.path().join("other.txt");
        fs::write(&dup, "incoming").unwrap();
        fs::write(&other, "other").unwrap();
        let mut log = RunLog::in_memory();

        let moved = move_files(&[dup.clone(), other], &dest, &mut log);

        assert_eq!(moved, vec!["dup.txt", "other.txt"]);
        assert!(!dup.exists());
        assert_eq!(fs::read_to_string(dest.join("dup.txt")).unwrap(), "incoming");
        assert!(log.records_in("file-move-error").is_empty());
    }

    #[test]
    fn test_unusable_destination_fails_every_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a dir").unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();
        let mut log = RunLog::in_memory();

        let report = move_batch(&[a.clone(), b.clone()], &blocker.join("sub"), &mut log);

        assert!(report.moved.is_empty());
        assert_eq!(report.failed_count(), 2);
        assert!(a.exists() && b.exists());
    }
}
