//! extidy - reversible, extension-based directory organization.
//!
//! `organize` moves each top-level file of a directory into a
//! subdirectory named after its lowercased extension and records the
//! pass as a timestamped session in a JSON move log kept alongside the
//! files. `undo` reverses the most recent session; `backup`, `list`,
//! `restore` and `delete` manage layout snapshots through the same log.
//!
//! # Caveats
//!
//! Undo and restore remove the directories a session created with
//! `remove_dir_all`, discarding any files placed there after the fact.
//! A structure backup records layout only: restoring it recreates
//! missing files as empty placeholders. Use a content backup when the
//! bytes matter.

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod extension;
pub mod lock;
pub mod move_log;
pub mod organizer;
pub mod output;
pub mod undo;

pub use backup::{
    backup_contents, backup_structure, delete_session, list_sessions, restore, BackupReport,
    RestoreReport, SessionKind, SessionSummary,
};
pub use config::{CompiledExclusions, ConfigError, ExcludeConfig};
pub use error::{Error, Result};
pub use lock::DirLock;
pub use move_log::{LogError, MoveLog, Session, LOG_FILE_NAME};
pub use organizer::{organize, OrganizeReport};
pub use undo::{undo_last, UndoReport};
