//! Advisory per-directory locking.
//!
//! Two processes organizing or undoing the same directory would race on
//! the move log and on the file moves themselves. Each operation holds a
//! [`DirLock`] across its whole load-modify-save cycle; a second
//! acquisition fails instead of waiting.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Name of the lock file placed next to the move log.
pub const LOCK_FILE_NAME: &str = ".extidy_log.lock";

#[derive(Debug)]
pub enum LockError {
    /// The lock file already exists.
    Held { path: PathBuf },
    /// The lock file could not be created.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Held { path } => write!(
                f,
                "Another operation holds the lock {} (remove it by hand if that process crashed)",
                path.display()
            ),
            Self::Io { path, source } => {
                write!(f, "Failed to create lock {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LockError {}

/// Exclusive advisory lock over one directory's move log.
///
/// Acquisition creates the lock file with `create_new`, so it fails if
/// any other process already holds it. The file is removed when the
/// guard drops. A crashed process leaves a stale lock behind; the error
/// message tells the user to remove it.
#[derive(Debug)]
pub struct DirLock {
    path: PathBuf,
}

impl DirLock {
    pub fn acquire(dir: &Path) -> Result<Self, LockError> {
        let path = dir.join(LOCK_FILE_NAME);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Self { path }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(LockError::Held { path }),
            Err(e) => Err(LockError::Io { path, source: e }),
        }
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_creates_and_drop_removes() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let lock_path = temp_dir.path().join(LOCK_FILE_NAME);

        {
            let _lock = DirLock::acquire(temp_dir.path()).expect("Acquire failed");
            assert!(lock_path.exists());
        }
        assert!(!lock_path.exists());
    }

    #[test]
    fn test_second_acquire_fails_while_held() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let _held = DirLock::acquire(temp_dir.path()).expect("Acquire failed");

        match DirLock::acquire(temp_dir.path()) {
            Err(LockError::Held { .. }) => {}
            other => panic!("Expected Held, got {:?}", other),
        }
    }

    #[test]
    fn test_reacquire_after_release() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        drop(DirLock::acquire(temp_dir.path()).expect("First acquire failed"));
        DirLock::acquire(temp_dir.path()).expect("Reacquire failed");
    }
}
