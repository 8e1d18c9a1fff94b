//! The organize pass.
//!
//! Moves every eligible top-level file of the target directory into a
//! subdirectory named after its lowercased extension, creating those
//! subdirectories on demand, and appends exactly one session describing
//! the pass to the move log.

use crate::config::CompiledExclusions;
use crate::error::{Error, Result};
use crate::extension::destination_dir;
use crate::lock::DirLock;
use crate::move_log::{MoveLog, Session};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// True for the tool's own artifacts, which are never organized or
/// backed up regardless of configuration.
pub(crate) fn is_internal_name(name: &str) -> bool {
    matches!(
        name,
        crate::move_log::LOG_FILE_NAME
            | crate::move_log::LOG_TEMP_NAME
            | crate::lock::LOCK_FILE_NAME
            | crate::config::CONFIG_FILE_NAME
            | crate::backup::STORE_DIR_NAME
    )
}

/// What one organize pass did (or, in dry-run mode, would do).
#[derive(Debug, Default)]
pub struct OrganizeReport {
    /// Timestamp of the appended session; `None` for a dry run, which
    /// records nothing.
    pub timestamp: Option<String>,
    /// `(file name, destination subdirectory)` for each completed move.
    pub moved: Vec<(String, String)>,
    /// Files left in place because they carry no usable extension.
    pub unclassified: Vec<String>,
    /// Per-file failures; these never abort the rest of the batch.
    pub failed: Vec<(PathBuf, String)>,
    pub dry_run: bool,
}

impl OrganizeReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Organizes the top-level files of `base` by extension.
///
/// Eligible entries are regular files that are neither the tool's own
/// artifacts nor excluded by configuration. Each is moved into
/// `<base>/<ext>/`; the subdirectory is created when absent and then
/// recorded in the session's `created_dirs`. An occupied destination
/// path is a per-file failure, not a reason to overwrite.
///
/// One session is appended and persisted even when nothing moved, so
/// every pass occupies a timestamp slot. The log is written only after
/// all filesystem mutation is done. Re-running on an organized
/// directory finds only subdirectories and appends an empty session.
///
/// With `dry_run` set, nothing is moved, created, locked or logged.
pub fn organize(
    base: &Path,
    exclusions: &CompiledExclusions,
    dry_run: bool,
) -> Result<OrganizeReport> {
    if !base.is_dir() {
        return Err(Error::TargetNotFound {
            path: base.to_path_buf(),
        });
    }

    let _lock;
    let mut log = if dry_run {
        MoveLog::default()
    } else {
        _lock = DirLock::acquire(base)?;
        // A malformed log aborts the pass before any file is touched.
        MoveLog::load(base)?
    };

    let entries = fs::read_dir(base).map_err(|e| Error::Io {
        path: base.to_path_buf(),
        source: e,
    })?;

    // Deterministic processing order.
    let mut names: Vec<String> = Vec::new();
    for entry in entries.flatten() {
        if let Ok(file_type) = entry.file_type()
            && file_type.is_file()
        {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();

    let mut session = Session::default();
    let mut report = OrganizeReport {
        dry_run,
        ..Default::default()
    };

    for name in &names {
        if is_internal_name(name) || exclusions.is_excluded(name) {
            continue;
        }

        let Some(dir_name) = destination_dir(name) else {
            report.unclassified.push(name.clone());
            continue;
        };

        let origin = base.join(name);
        let dest_dir = base.join(&dir_name);

        if dry_run {
            report.moved.push((name.clone(), dir_name));
            continue;
        }

        if !dest_dir.exists() {
            if let Err(e) = fs::create_dir(&dest_dir) {
                report.failed.push((
                    origin,
                    format!("could not create {}: {}", dest_dir.display(), e),
                ));
                continue;
            }
            session.record_created_dir(dest_dir.clone());
        }

        let destination = dest_dir.join(name);
        if destination.exists() {
            report.failed.push((
                origin,
                format!("destination {} already occupied", destination.display()),
            ));
            continue;
        }

        match fs::rename(&origin, &destination) {
            Ok(()) => {
                session.record_move(name, origin, destination);
                report.moved.push((name.clone(), dir_name));
            }
            Err(e) => {
                report.failed.push((origin, format!("could not move: {}", e)));
            }
        }
    }

    if !dry_run {
        let timestamp = log.unique_timestamp(Local::now());
        log.append_session(&timestamp, session)?;
        log.save(base)?;
        report.timestamp = Some(timestamp);
    }

    Ok(report)
}
