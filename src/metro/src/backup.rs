//! One-time backup of the original save bytes.
//!
//! The backup is written before the first edit and then left alone: an
//! existing backup file is never overwritten, so the original save survives
//! any number of later edits. The existence check is not atomic, so this is
//! single-writer only; concurrent invocations against the same backup path
//! could race.

use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Write `raw` to `backup_path` unless a backup already exists there.
///
/// Returns `true` if a new backup was written.
pub fn write_backup_once(backup_path: &Path, raw: &[u8]) -> Result<bool, BackupError> {
    if backup_path.exists() {
        return Ok(false);
    }
    fs::write(backup_path, raw)?;
    Ok(true)
}
