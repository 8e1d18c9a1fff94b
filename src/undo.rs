//! Reversal of the most recent organize session.
//!
//! Files are moved back to their recorded origins one by one;
//! individual failures are collected, never fatal. Directories the
//! session created are then removed wholesale with `remove_dir_all`,
//! even if files were placed in them after the organize ran — a
//! deliberate, documented trade-off inherited from the tool's recorded
//! behavior, not a bug to fix silently.

use crate::error::{Error, Result};
use crate::lock::DirLock;
use crate::move_log::MoveLog;
use std::fs;
use std::path::{Path, PathBuf};

/// What an undo pass restored, skipped and failed.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Timestamp of the session that was reversed.
    pub timestamp: String,
    /// Files moved back to their origin.
    pub restored: usize,
    /// Moves skipped because the file is no longer at its recorded
    /// destination.
    pub skipped: Vec<(PathBuf, String)>,
    /// Moves or directory removals that failed.
    pub failed: Vec<(PathBuf, String)>,
    /// Created-by-session directories that were removed.
    pub removed_dirs: Vec<PathBuf>,
}

impl UndoReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// Reverses the single most recent session for `base`.
///
/// Fails with [`Error::NothingToUndo`] when the log holds no sessions.
/// Every `(origin, destination)` pair is replayed backwards
/// best-effort: a missing source is skipped, an occupied origin or
/// failed rename is recorded, and the rest of the batch continues
/// regardless. The session record is removed afterwards either way, and
/// the log file itself is deleted once its last session is gone.
pub fn undo_last(base: &Path) -> Result<UndoReport> {
    if !base.is_dir() {
        return Err(Error::TargetNotFound {
            path: base.to_path_buf(),
        });
    }

    let _lock = DirLock::acquire(base)?;
    let mut log = MoveLog::load(base)?;

    let Some(timestamp) = log.latest().map(str::to_owned) else {
        return Err(Error::NothingToUndo);
    };
    let session = log.remove_session(&timestamp)?;

    let mut report = UndoReport {
        timestamp,
        ..Default::default()
    };

    for (origin, destination) in session.moves.values() {
        // Identity pairs are snapshot markers, not moves.
        if origin == destination {
            continue;
        }
        if !destination.exists() {
            report.skipped.push((
                destination.clone(),
                "file not found at recorded location".to_string(),
            ));
            continue;
        }
        if origin.exists() {
            report.failed.push((
                origin.clone(),
                "origin path already occupied".to_string(),
            ));
            continue;
        }
        match fs::rename(destination, origin) {
            Ok(()) => report.restored += 1,
            Err(e) => report
                .failed
                .push((destination.clone(), format!("could not move back: {}", e))),
        }
    }

    // Unconditional removal: anything placed in these directories after
    // the organize ran is discarded with them.
    for dir in &session.created_dirs {
        if !dir.exists() {
            continue;
        }
        match fs::remove_dir_all(dir) {
            Ok(()) => report.removed_dirs.push(dir.clone()),
            Err(e) => report
                .failed
                .push((dir.clone(), format!("could not remove directory: {}", e))),
        }
    }

    log.persist(base)?;
    Ok(report)
}
