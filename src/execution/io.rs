//! File system primitives for relocating files
//!
//! - Idempotent directory creation
//! - Rename, with a copy + remove fallback across file systems
//! - An existing file of the same name at the destination is replaced

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::FileMoveError;

/// Create `dir` and any missing parents. An existing directory is left as-is.
pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)
}

/// Move `source` into `destination_dir`, keeping its base name.
///
/// Returns the new path. A file already at that path is overwritten where the
/// platform's rename allows it. Fails if the source is missing, has no file
/// name, or the destination name is taken by a directory.
pub fn relocate_file(source: &Path, destination_dir: &Path) -> Result<PathBuf, FileMoveError> {
    let file_name = source
        .file_name()
        .ok_or_else(|| FileMoveError::new(source, destination_dir, "Source has no file name"))?;
    let destination = destination_dir.join(file_name);

    if fs::symlink_metadata(source).is_err() {
        return Err(FileMoveError::new(source, &destination, "Source not found"));
    }

    match fs::rename(source, &destination) {
        Ok(()) => Ok(destination),
        Err(e) if is_cross_device(&e) => {
            copy_then_remove(source, &destination)?;
            Ok(destination)
        }
        Err(e) => Err(FileMoveError::new(source, &destination, e.to_string())),
    }
}

/// Rename cannot cross file systems; copy the data and drop the source instead
fn copy_then_remove(source: &Path, destination: &Path) -> Result<(), FileMoveError> {
    fs::copy(source, destination).map_err(|e| {
        FileMoveError::new(source, destination, format!("Failed to copy: {}", e))
    })?;

    if let Err(e) = fs::remove_file(source) {
        // Leave exactly one copy behind
        let _ = fs::remove_file(destination);
        return Err(FileMoveError::new(
            source,
            destination,
            format!("Failed to remove source: {}", e),
        ));
    }

    Ok(())
}

fn is_cross_device(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::CrossesDevices
}
