//! The durable move-log store.
//!
//! Every organize or backup pass appends one timestamped [`Session`] to
//! a single JSON file kept inside the organized directory. The log is
//! the source of truth for undo and restore: it records where each file
//! came from, where it went, and which directories the pass created.
//!
//! Timestamps are `%Y%m%d_%H%M%S`-formatted local times, so their
//! lexicographic order is their chronological order and the most recent
//! session is always the maximum key.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the persisted log inside an organized directory.
pub const LOG_FILE_NAME: &str = ".extidy_log.json";

/// Scratch file the log is written to before the atomic rename.
pub const LOG_TEMP_NAME: &str = ".extidy_log.json.tmp";

/// Errors raised by the move-log store.
#[derive(Debug)]
pub enum LogError {
    /// The log file exists but could not be read.
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The log file could not be written or replaced.
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The log file exists but does not parse. Never downgraded to an
    /// empty log.
    Malformed { path: PathBuf, reason: String },
    /// A session with this timestamp is already recorded.
    TimestampCollision { timestamp: String },
    /// No session with this timestamp (or selection) exists.
    SessionNotFound { timestamp: String },
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadFailed { path, source } => {
                write!(f, "Failed to read move log {}: {}", path.display(), source)
            }
            Self::WriteFailed { path, source } => {
                write!(f, "Failed to write move log {}: {}", path.display(), source)
            }
            Self::Malformed { path, reason } => {
                write!(f, "Move log {} is malformed: {}", path.display(), reason)
            }
            Self::TimestampCollision { timestamp } => {
                write!(f, "A session with timestamp {} already exists", timestamp)
            }
            Self::SessionNotFound { timestamp } => {
                write!(f, "No session found for {}", timestamp)
            }
        }
    }
}

impl std::error::Error for LogError {}

/// Result type for move-log operations.
pub type LogResult<T> = Result<T, LogError>;

/// One recorded organize or backup pass.
///
/// `moves` maps a path relative to the organized directory to the file's
/// `(origin, destination)` pair. An organize session moves files, so the
/// two paths differ; a structure snapshot records the same path twice as
/// a layout marker; a content backup points the destination at the
/// stored copy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// Relative path -> (origin, destination).
    #[serde(default)]
    pub moves: BTreeMap<String, (PathBuf, PathBuf)>,
    /// Directories this pass created, in creation order. Directories
    /// that already existed must never appear here.
    #[serde(default)]
    pub created_dirs: Vec<PathBuf>,
}

impl Session {
    /// Records one `(origin, destination)` pair under `key`.
    pub fn record_move(&mut self, key: &str, origin: PathBuf, destination: PathBuf) {
        self.moves.insert(key.to_string(), (origin, destination));
    }

    /// Records a directory created by this pass.
    pub fn record_created_dir(&mut self, dir: PathBuf) {
        self.created_dirs.push(dir);
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty() && self.created_dirs.is_empty()
    }
}

/// The persisted aggregate of sessions for one directory.
///
/// Sessions are keyed by timestamp in a `BTreeMap`, so iteration is
/// chronological and [`MoveLog::latest`] is the last key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveLog {
    #[serde(default)]
    pub sessions: BTreeMap<String, Session>,
}

impl MoveLog {
    /// Path of the persisted log for a directory.
    pub fn log_path(dir: &Path) -> PathBuf {
        dir.join(LOG_FILE_NAME)
    }

    /// True when a log has been persisted for this directory.
    pub fn exists(dir: &Path) -> bool {
        Self::log_path(dir).exists()
    }

    /// Loads the persisted log, or an empty log when none exists.
    ///
    /// A missing file is not an error; a file that exists but does not
    /// parse is reported as [`LogError::Malformed`].
    pub fn load(dir: &Path) -> LogResult<Self> {
        let path = Self::log_path(dir);
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path).map_err(|e| LogError::ReadFailed {
            path: path.clone(),
            source: e,
        })?;

        serde_json::from_str(&raw).map_err(|e| LogError::Malformed {
            path,
            reason: e.to_string(),
        })
    }

    /// Writes the full log, replacing any prior file.
    ///
    /// The content goes to a scratch file first and is renamed into
    /// place, so a crash mid-write leaves the previous valid log intact.
    pub fn save(&self, dir: &Path) -> LogResult<()> {
        let path = Self::log_path(dir);
        let scratch = dir.join(LOG_TEMP_NAME);

        let raw = serde_json::to_string_pretty(self).map_err(|e| LogError::WriteFailed {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
        })?;

        fs::write(&scratch, raw).map_err(|e| LogError::WriteFailed {
            path: scratch.clone(),
            source: e,
        })?;

        fs::rename(&scratch, &path).map_err(|e| LogError::WriteFailed { path, source: e })
    }

    /// Adds one session keyed by its timestamp.
    ///
    /// A colliding timestamp is rejected, never overwritten; callers
    /// obtain a free slot from [`MoveLog::unique_timestamp`].
    pub fn append_session(&mut self, timestamp: &str, session: Session) -> LogResult<()> {
        if self.sessions.contains_key(timestamp) {
            return Err(LogError::TimestampCollision {
                timestamp: timestamp.to_string(),
            });
        }
        self.sessions.insert(timestamp.to_string(), session);
        Ok(())
    }

    /// Removes and returns one session.
    pub fn remove_session(&mut self, timestamp: &str) -> LogResult<Session> {
        self.sessions
            .remove(timestamp)
            .ok_or_else(|| LogError::SessionNotFound {
                timestamp: timestamp.to_string(),
            })
    }

    /// The most recent timestamp, or `None` when no sessions exist.
    pub fn latest(&self) -> Option<&str> {
        self.sessions.keys().next_back().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// All timestamps, oldest first. Stable across calls.
    pub fn timestamps(&self) -> Vec<String> {
        self.sessions.keys().cloned().collect()
    }

    /// Saves the log, or removes the backing file once the session map
    /// is empty — an empty shell is never left on disk.
    pub fn persist(&self, dir: &Path) -> LogResult<()> {
        if self.sessions.is_empty() {
            Self::delete_file(dir)
        } else {
            self.save(dir)
        }
    }

    /// Removes the persisted log file, if present.
    pub fn delete_file(dir: &Path) -> LogResult<()> {
        let path = Self::log_path(dir);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| LogError::WriteFailed { path, source: e })?;
        }
        Ok(())
    }

    /// Timestamp for a new session: seconds-resolution local time,
    /// suffixed with `_02`, `_03`, … when that slot is already taken so
    /// repeated runs within one second still sort correctly.
    pub fn unique_timestamp(&self, now: DateTime<Local>) -> String {
        let base = now.format("%Y%m%d_%H%M%S").to_string();
        if !self.sessions.contains_key(&base) {
            return base;
        }
        let mut n = 2u32;
        loop {
            let candidate = format!("{base}_{n:02}");
            if !self.sessions.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}
