//! Operation-level errors shared by the organize, undo and backup
//! engines, with their process exit codes.

use crate::config::ConfigError;
use crate::lock::LockError;
use crate::move_log::LogError;
use std::path::PathBuf;

/// Errors an operation can fail with before or during its run.
///
/// Per-file problems (a move that cannot complete, a directory that
/// cannot be created) are not errors at this level: they are collected
/// into the operation's report and the batch continues.
#[derive(Debug)]
pub enum Error {
    /// The target directory does not exist or is not a directory.
    TargetNotFound { path: PathBuf },
    /// Undo was requested but the log holds no sessions.
    NothingToUndo,
    /// Restore or delete was requested but no log has been persisted.
    NoLog { path: PathBuf },
    /// The move-log store failed.
    Log(LogError),
    /// Another process holds the directory lock.
    Lock(LockError),
    /// The exclusion-rule configuration could not be loaded or compiled.
    Config(ConfigError),
    /// An I/O failure outside the per-file best-effort scope.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Maps each failure condition to a distinct non-zero exit code.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::TargetNotFound { .. } => 1,
            Self::NothingToUndo | Self::NoLog { .. } => 2,
            Self::Log(LogError::SessionNotFound { .. }) => 3,
            Self::Log(LogError::Malformed { .. }) => 4,
            Self::Lock(_) => 5,
            Self::Config(_) => 6,
            Self::Log(_) | Self::Io { .. } => 7,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TargetNotFound { path } => {
                write!(f, "Target directory not found: {}", path.display())
            }
            Self::NothingToUndo => write!(f, "No organization recorded. Nothing to undo."),
            Self::NoLog { path } => {
                write!(f, "No move log found in {}", path.display())
            }
            Self::Log(e) => write!(f, "{}", e),
            Self::Lock(e) => write!(f, "{}", e),
            Self::Config(e) => write!(f, "{}", e),
            Self::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<LogError> for Error {
    fn from(e: LogError) -> Self {
        Self::Log(e)
    }
}

impl From<LockError> for Error {
    fn from(e: LockError) -> Self {
        Self::Lock(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Result type for top-level operations.
pub type Result<T> = std::result::Result<T, Error>;
