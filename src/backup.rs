//! Layout snapshots: backup, list, restore, delete.
//!
//! A structure backup walks the whole subtree and records every file as
//! an identity `(path, path)` pair — which files existed and where, not
//! what they contained. Restoring one recreates missing files as empty
//! placeholders; that limitation is inherent to the strategy. The
//! content backup is the alternative: it copies each file into the
//! tool's store directory and restore copies the bytes back. Both kinds
//! share the move log and its session lifecycle.

use crate::error::{Error, Result};
use crate::lock::DirLock;
use crate::move_log::{LogError, MoveLog, Session};
use crate::organizer::is_internal_name;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory holding content-backup copies, one subdirectory per
/// session timestamp.
pub const STORE_DIR_NAME: &str = ".extidy_store";

/// The shape of a recorded session, derived from its pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// Files were moved: origin differs from destination.
    Organize,
    /// Identity pairs: layout snapshot without content.
    Snapshot,
    /// Destinations point into the content store.
    ContentBackup,
    /// No recorded pairs.
    Empty,
}

impl SessionKind {
    pub fn of(session: &Session) -> Self {
        if session.moves.is_empty() {
            return Self::Empty;
        }
        if session.moves.values().all(|(a, b)| a == b) {
            return Self::Snapshot;
        }
        let in_store = |p: &PathBuf| p.components().any(|c| c.as_os_str() == STORE_DIR_NAME);
        if session.moves.values().all(|(_, b)| in_store(b)) {
            Self::ContentBackup
        } else {
            Self::Organize
        }
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Organize => "organize",
            Self::Snapshot => "structure backup",
            Self::ContentBackup => "content backup",
            Self::Empty => "empty",
        };
        write!(f, "{}", label)
    }
}

/// One row of the `list` output.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub timestamp: String,
    pub files: usize,
    pub kind: SessionKind,
}

/// What a backup pass recorded.
#[derive(Debug, Default)]
pub struct BackupReport {
    pub timestamp: String,
    pub files: usize,
    /// Per-file copy failures (content backups only).
    pub failed: Vec<(PathBuf, String)>,
}

/// What a restore pass did.
#[derive(Debug, Default)]
pub struct RestoreReport {
    pub timestamp: String,
    /// Missing files recreated as empty placeholders.
    pub placeholders: usize,
    /// Missing files restored from stored copies.
    pub copied: usize,
    pub failed: Vec<(PathBuf, String)>,
    pub removed_dirs: Vec<PathBuf>,
}

fn walk_files(base: &Path, failed: &mut Vec<(PathBuf, String)>) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = WalkDir::new(base).min_depth(1).into_iter().filter_entry(|e| {
        !is_internal_name(e.file_name().to_string_lossy().as_ref())
    });
    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                failed.push((path, e.to_string()));
            }
        }
    }
    files.sort();
    files
}

/// Records a structure snapshot of the whole subtree under `base`.
///
/// Every file becomes an identity pair keyed by its path relative to
/// `base`. `created_dirs` stays empty: a snapshot never claims
/// directories it did not create.
pub fn backup_structure(base: &Path) -> Result<BackupReport> {
    if !base.is_dir() {
        return Err(Error::TargetNotFound {
            path: base.to_path_buf(),
        });
    }

    let _lock = DirLock::acquire(base)?;
    let mut log = MoveLog::load(base)?;

    let mut report = BackupReport::default();
    let mut session = Session::default();
    for path in walk_files(base, &mut report.failed) {
        let Ok(rel) = path.strip_prefix(base) else {
            continue;
        };
        session.record_move(&rel.to_string_lossy(), path.clone(), path.clone());
    }
    report.files = session.moves.len();

    let timestamp = log.unique_timestamp(Local::now());
    log.append_session(&timestamp, session)?;
    log.save(base)?;
    report.timestamp = timestamp;
    Ok(report)
}

/// Records a content backup: every file is copied into
/// `<base>/.extidy_store/<timestamp>/<relative path>` and the pair maps
/// the original to its stored copy.
///
/// Copy failures are collected per file; the session records only the
/// copies that succeeded.
pub fn backup_contents(base: &Path) -> Result<BackupReport> {
    if !base.is_dir() {
        return Err(Error::TargetNotFound {
            path: base.to_path_buf(),
        });
    }

    let _lock = DirLock::acquire(base)?;
    let mut log = MoveLog::load(base)?;
    let timestamp = log.unique_timestamp(Local::now());
    let store_root = base.join(STORE_DIR_NAME).join(&timestamp);

    let mut report = BackupReport::default();
    let mut session = Session::default();
    for path in walk_files(base, &mut report.failed) {
        let Ok(rel) = path.strip_prefix(base) else {
            continue;
        };
        let copy = store_root.join(rel);
        if let Some(parent) = copy.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            report
                .failed
                .push((path.clone(), format!("could not create store dir: {}", e)));
            continue;
        }
        match fs::copy(&path, &copy) {
            Ok(_) => session.record_move(&rel.to_string_lossy(), path.clone(), copy),
            Err(e) => report
                .failed
                .push((path.clone(), format!("could not copy: {}", e))),
        }
    }
    report.files = session.moves.len();

    log.append_session(&timestamp, session)?;
    log.save(base)?;
    report.timestamp = timestamp;
    Ok(report)
}

/// All recorded sessions, oldest first. The ordering is stable across
/// calls, so list positions can be used to select a session.
pub fn list_sessions(base: &Path) -> Result<Vec<SessionSummary>> {
    if !base.is_dir() {
        return Err(Error::TargetNotFound {
            path: base.to_path_buf(),
        });
    }

    let log = MoveLog::load(base)?;
    Ok(log
        .sessions
        .iter()
        .map(|(timestamp, session)| SessionSummary {
            timestamp: timestamp.clone(),
            files: session.moves.len(),
            kind: SessionKind::of(session),
        })
        .collect())
}

/// Restores one recorded session and removes it from the log.
///
/// For every recorded pair whose origin no longer exists, the parent
/// directories are recreated and the file is brought back: as an empty
/// placeholder for snapshot pairs (content is not preserved by that
/// strategy), or by copying the stored bytes back for content-backup
/// pairs. Directories in the session's `created_dirs` that still exist
/// are removed as extraneous. The session's private store directory is
/// cleaned up afterwards.
pub fn restore(base: &Path, timestamp: &str) -> Result<RestoreReport> {
    if !base.is_dir() {
        return Err(Error::TargetNotFound {
            path: base.to_path_buf(),
        });
    }

    let _lock = DirLock::acquire(base)?;
    if !MoveLog::exists(base) {
        return Err(Error::NoLog {
            path: base.to_path_buf(),
        });
    }
    let mut log = MoveLog::load(base)?;
    let session = log.remove_session(timestamp)?;

    let mut report = RestoreReport {
        timestamp: timestamp.to_string(),
        ..Default::default()
    };

    for (origin, recorded) in session.moves.values() {
        if origin.exists() {
            continue;
        }
        if let Some(parent) = origin.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            report
                .failed
                .push((origin.clone(), format!("could not recreate parent: {}", e)));
            continue;
        }
        if recorded == origin {
            // Structure snapshot: layout only, content is gone.
            match fs::write(origin, "") {
                Ok(()) => report.placeholders += 1,
                Err(e) => report
                    .failed
                    .push((origin.clone(), format!("could not recreate: {}", e))),
            }
        } else if recorded.exists() {
            match fs::copy(recorded, origin) {
                Ok(_) => report.copied += 1,
                Err(e) => report
                    .failed
                    .push((origin.clone(), format!("could not copy back: {}", e))),
            }
        } else {
            report
                .failed
                .push((recorded.clone(), "stored copy missing".to_string()));
        }
    }

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

    discard_session_store(base, timestamp);
    log.persist(base)?;
    Ok(report)
}

/// Removes one recorded session without touching any user files. The
/// session's private store directory (the tool's own artifact) is
/// discarded with it.
pub fn delete_session(base: &Path, timestamp: &str) -> Result<()> {
    if !base.is_dir() {
        return Err(Error::TargetNotFound {
            path: base.to_path_buf(),
        });
    }

    let _lock = DirLock::acquire(base)?;
    if !MoveLog::exists(base) {
        return Err(Error::NoLog {
            path: base.to_path_buf(),
        });
    }
    let mut log = MoveLog::load(base)?;
    log.remove_session(timestamp)?;

    discard_session_store(base, timestamp);
    log.persist(base)?;
    Ok(())
}

/// Translates a 1-based `list` position into its timestamp.
pub fn select_timestamp(base: &Path, selection: usize) -> Result<String> {
    if base.is_dir() && !MoveLog::exists(base) {
        return Err(Error::NoLog {
            path: base.to_path_buf(),
        });
    }
    let sessions = list_sessions(base)?;
    if selection == 0 || selection > sessions.len() {
        return Err(Error::Log(LogError::SessionNotFound {
            timestamp: format!("selection #{selection}"),
        }));
    }
    Ok(sessions[selection - 1].timestamp.clone())
}

/// Drops `<base>/.extidy_store/<timestamp>`, and the store root itself
/// once no session directories remain. Best-effort cleanup of the
/// tool's own artifacts.
fn discard_session_store(base: &Path, timestamp: &str) {
    let store_root = base.join(STORE_DIR_NAME);
    let session_store = store_root.join(timestamp);
    if session_store.exists() {
        let _ = fs::remove_dir_all(&session_store);
    }
    if let Ok(mut entries) = fs::read_dir(&store_root)
        && entries.next().is_none()
    {
        let _ = fs::remove_dir(&store_root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_log::LOG_FILE_NAME;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_structure_backup_records_identity_pairs() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "a").expect("Failed to write");
        fs::create_dir(base.join("sub")).expect("Failed to create dir");
        fs::write(base.join("sub").join("b.pdf"), "b").expect("Failed to write");

        let report = backup_structure(base).expect("Backup failed");

        assert_eq!(report.files, 2);
        let log = MoveLog::load(base).expect("Load failed");
        let session = &log.sessions[&report.timestamp];
        assert_eq!(SessionKind::of(session), SessionKind::Snapshot);
        assert!(session.created_dirs.is_empty());
        let (origin, dest) = &session.moves["a.txt"];
        assert_eq!(origin, dest);
        assert!(session.moves.contains_key("sub/b.pdf"));
        // Files themselves are untouched.
        assert!(base.join("a.txt").exists());
    }

    #[test]
    fn test_structure_backup_skips_tool_artifacts() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join(LOG_FILE_NAME), "{}").expect("Failed to write");
        fs::write(base.join("a.txt"), "a").expect("Failed to write");

        let report = backup_structure(base).expect("Backup failed");

        assert_eq!(report.files, 1);
        let log = MoveLog::load(base).expect("Load failed");
        assert!(!log.sessions[&report.timestamp].moves.contains_key(LOG_FILE_NAME));
    }

    #[test]
    fn test_restore_recreates_missing_files_as_placeholders() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("sub")).expect("Failed to create dir");
        fs::write(base.join("sub").join("b.pdf"), "content").expect("Failed to write");
        let report = backup_structure(base).expect("Backup failed");

        fs::remove_file(base.join("sub").join("b.pdf")).expect("Failed to remove");
        fs::remove_dir(base.join("sub")).expect("Failed to remove dir");

        let restored = restore(base, &report.timestamp).expect("Restore failed");

        assert_eq!(restored.placeholders, 1);
        assert!(base.join("sub").join("b.pdf").exists());
        // Structure-only: the content is not preserved.
        let content =
            fs::read_to_string(base.join("sub").join("b.pdf")).expect("Failed to read");
        assert!(content.is_empty());
        // Session consumed; log file deleted with its last session.
        assert!(!MoveLog::exists(base));
    }

    #[test]
    fn test_restore_leaves_existing_files_alone() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "original").expect("Failed to write");
        let report = backup_structure(base).expect("Backup failed");

        let restored = restore(base, &report.timestamp).expect("Restore failed");

        assert_eq!(restored.placeholders, 0);
        let content = fs::read_to_string(base.join("a.txt")).expect("Failed to read");
        assert_eq!(content, "original");
    }

    #[test]
    fn test_content_backup_and_restore_preserve_bytes() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "precious bytes").expect("Failed to write");

        let report = backup_contents(base).expect("Backup failed");
        assert_eq!(report.files, 1);
        assert!(base
            .join(STORE_DIR_NAME)
            .join(&report.timestamp)
            .join("a.txt")
            .exists());

        fs::remove_file(base.join("a.txt")).expect("Failed to remove");
        let restored = restore(base, &report.timestamp).expect("Restore failed");

        assert_eq!(restored.copied, 1);
        let content = fs::read_to_string(base.join("a.txt")).expect("Failed to read");
        assert_eq!(content, "precious bytes");
        // The session's store directory is cleaned up with it.
        assert!(!base.join(STORE_DIR_NAME).exists());
    }

    #[test]
    fn test_content_backup_does_not_back_up_the_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "a").expect("Failed to write");
        backup_contents(base).expect("First backup failed");

        let second = backup_contents(base).expect("Second backup failed");

        // Only the real file, not the first backup's copies.
        assert_eq!(second.files, 1);
    }

    #[test]
    fn test_list_is_chronological_and_stable() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "a").expect("Failed to write");
        backup_structure(base).expect("Backup failed");
        backup_structure(base).expect("Backup failed");

        let first = list_sessions(base).expect("List failed");
        let second = list_sessions(base).expect("List failed");

        assert_eq!(first.len(), 2);
        assert!(first[0].timestamp < first[1].timestamp);
        let timestamps: Vec<_> = second.iter().map(|s| s.timestamp.clone()).collect();
        assert_eq!(
            timestamps,
            first.iter().map(|s| s.timestamp.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_list_on_missing_log_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let sessions = list_sessions(temp_dir.path()).expect("List failed");
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_restore_unknown_timestamp() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "a").expect("Failed to write");
        backup_structure(base).expect("Backup failed");

        let result = restore(base, "19990101_000000");
        assert!(matches!(
            result,
            Err(Error::Log(LogError::SessionNotFound { .. }))
        ));
    }

    #[test]
    fn test_restore_without_log() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = restore(temp_dir.path(), "20260101_000000");
        assert!(matches!(result, Err(Error::NoLog { .. })));
    }

    #[test]
    fn test_delete_removes_record_but_not_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "a").expect("Failed to write");
        let report = backup_structure(base).expect("Backup failed");

        delete_session(base, &report.timestamp).expect("Delete failed");

        assert!(base.join("a.txt").exists());
        // Last session removed, so the log file goes too.
        assert!(!MoveLog::exists(base));
        assert!(list_sessions(base).expect("List failed").is_empty());
    }

    #[test]
    fn test_delete_keeps_other_sessions() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "a").expect("Failed to write");
        let first = backup_structure(base).expect("Backup failed");
        let second = backup_structure(base).expect("Backup failed");

        delete_session(base, &first.timestamp).expect("Delete failed");

        let remaining = list_sessions(base).expect("List failed");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].timestamp, second.timestamp);
        assert!(MoveLog::exists(base));
    }

    #[test]
    fn test_select_timestamp_translates_positions() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "a").expect("Failed to write");
        let first = backup_structure(base).expect("Backup failed");
        let second = backup_structure(base).expect("Backup failed");

        assert_eq!(
            select_timestamp(base, 1).expect("Select failed"),
            first.timestamp
        );
        assert_eq!(
            select_timestamp(base, 2).expect("Select failed"),
            second.timestamp
        );
        assert!(matches!(
            select_timestamp(base, 3),
            Err(Error::Log(LogError::SessionNotFound { .. }))
        ));
        assert!(matches!(
            select_timestamp(base, 0),
            Err(Error::Log(LogError::SessionNotFound { .. }))
        ));
    }

    #[test]
    fn test_session_kind_classification() {
        let mut snapshot = Session::default();
        snapshot.record_move("a.txt", PathBuf::from("/d/a.txt"), PathBuf::from("/d/a.txt"));
        assert_eq!(SessionKind::of(&snapshot), SessionKind::Snapshot);

        let mut organize = Session::default();
        organize.record_move(
            "a.txt",
            PathBuf::from("/d/a.txt"),
            PathBuf::from("/d/txt/a.txt"),
        );
        assert_eq!(SessionKind::of(&organize), SessionKind::Organize);

        let mut content = Session::default();
        content.record_move(
            "a.txt",
            PathBuf::from("/d/a.txt"),
            PathBuf::from(format!("/d/{STORE_DIR_NAME}/20260101_000000/a.txt")),
        );
        assert_eq!(SessionKind::of(&content), SessionKind::ContentBackup);

        assert_eq!(SessionKind::of(&Session::default()), SessionKind::Empty);
    }
}
