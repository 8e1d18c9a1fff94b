//! Command-line interface.
//!
//! Thin dispatch layer: parse the requested action, call the matching
//! engine, print its report. All failure-to-exit-code mapping lives in
//! the error type; per-file problems are printed here and do not fail
//! the process.

use crate::backup;
use crate::config::ExcludeConfig;
use crate::error::Result;
use crate::organizer::{self, OrganizeReport};
use crate::output::OutputFormatter;
use crate::undo::{self, UndoReport};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "extidy", version)]
#[command(about = "Organize a directory by file extension, with a reversible move log")]
pub struct Cli {
    /// Directory to operate on.
    pub dir: PathBuf,

    /// Exclusion-rule file to use instead of the default lookup.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Move each file into a subdirectory named after its extension.
    Organize {
        /// Show what would move without touching anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Reverse the most recent organize session.
    ///
    /// Directories created by that session are removed wholesale, even
    /// if files were added to them afterwards.
    Undo,
    /// Record a snapshot of the directory's current layout.
    ///
    /// A plain backup records layout only; restoring it recreates
    /// missing files as empty placeholders. Use --contents for a
    /// copying backup that preserves file contents.
    Backup {
        /// Copy file contents into the backup store.
        #[arg(long)]
        contents: bool,
    },
    /// List recorded sessions, oldest first.
    List,
    /// Restore a recorded session by its position in `list`.
    Restore { selection: usize },
    /// Remove a recorded session without touching any files.
    Delete { selection: usize },
}

pub fn run(cli: &Cli) -> Result<()> {
    let dir = &cli.dir;
    match &cli.command {
        Command::Organize { dry_run } => {
            let exclusions = ExcludeConfig::load(dir, cli.config.as_deref())?.compile()?;
            let report = organizer::organize(dir, &exclusions, *dry_run)?;
            print_organize_report(&report);
            Ok(())
        }
        Command::Undo => {
            let report = undo::undo_last(dir)?;
            print_undo_report(&report);
            Ok(())
        }
        Command::Backup { contents } => {
            let spinner = OutputFormatter::spinner("Recording backup...");
            let outcome = if *contents {
                backup::backup_contents(dir)
            } else {
                backup::backup_structure(dir)
            };
            spinner.finish_and_clear();

            let report = outcome?;
            for (path, reason) in &report.failed {
                OutputFormatter::error(&format!("{}: {}", path.display(), reason));
            }
            OutputFormatter::success(&format!(
                "Backup {} recorded ({} files)",
                report.timestamp, report.files
            ));
            Ok(())
        }
        Command::List => {
            let sessions = backup::list_sessions(dir)?;
            if sessions.is_empty() {
                OutputFormatter::info("No backups found.");
            } else {
                OutputFormatter::session_table(&sessions);
            }
            Ok(())
        }
        Command::Restore { selection } => {
            let timestamp = backup::select_timestamp(dir, *selection)?;
            let report = backup::restore(dir, &timestamp)?;
            for (path, reason) in &report.failed {
                OutputFormatter::error(&format!("{}: {}", path.display(), reason));
            }
            if report.placeholders > 0 {
                OutputFormatter::warning(&format!(
                    "{} missing files recreated as empty placeholders (structure backup does not preserve content)",
                    report.placeholders
                ));
            }
            OutputFormatter::success(&format!(
                "Restored session {} ({} placeholders, {} copied back)",
                report.timestamp, report.placeholders, report.copied
            ));
            Ok(())
        }
        Command::Delete { selection } => {
            let timestamp = backup::select_timestamp(dir, *selection)?;
            backup::delete_session(dir, &timestamp)?;
            OutputFormatter::success(&format!("Deleted session {}", timestamp));
            Ok(())
        }
    }
}

fn print_organize_report(report: &OrganizeReport) {
    if report.dry_run {
        for (name, dest) in &report.moved {
            OutputFormatter::plain(&format!("[dry run] {} → {}/", name, dest));
        }
        OutputFormatter::info(&format!(
            "Dry run: {} files would move, nothing was changed.",
            report.moved.len()
        ));
        return;
    }

    for (name, dest) in &report.moved {
        OutputFormatter::success(&format!("{} → {}/", name, dest));
    }
    for name in &report.unclassified {
        OutputFormatter::plain(&format!("  {} (no extension, left in place)", name));
    }
    for (path, reason) in &report.failed {
        OutputFormatter::error(&format!("{}: {}", path.display(), reason));
    }

    OutputFormatter::info(&format!(
        "Organized {} files. Run 'undo' to revert this session.",
        report.moved.len()
    ));
    if !report.failed.is_empty() {
        OutputFormatter::warning("Some files could not be organized; see errors above.");
    }
}

fn print_undo_report(report: &UndoReport) {
    for (path, reason) in &report.skipped {
        OutputFormatter::warning(&format!("skipped {}: {}", path.display(), reason));
    }
    for (path, reason) in &report.failed {
        OutputFormatter::error(&format!("{}: {}", path.display(), reason));
    }
    for dir in &report.removed_dirs {
        OutputFormatter::plain(&format!("  removed {}/", dir.display()));
    }
    OutputFormatter::success(&format!(
        "Undid session {}: {} files restored.",
        report.timestamp, report.restored
    ));
    if !report.is_clean() {
        OutputFormatter::warning("Some files could not be restored; see messages above.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_organize_with_dry_run() {
        let cli = Cli::try_parse_from(["extidy", "/tmp/target", "organize", "--dry-run"])
            .expect("Parse failed");
        assert_eq!(cli.dir, PathBuf::from("/tmp/target"));
        assert!(matches!(cli.command, Command::Organize { dry_run: true }));
    }

    #[test]
    fn test_cli_parses_restore_selection() {
        let cli =
            Cli::try_parse_from(["extidy", "/tmp/target", "restore", "2"]).expect("Parse failed");
        assert!(matches!(cli.command, Command::Restore { selection: 2 }));
    }

    #[test]
    fn test_cli_parses_global_config_after_subcommand() {
        let cli = Cli::try_parse_from([
            "extidy",
            "/tmp/target",
            "organize",
            "--config",
            "/tmp/rules.toml",
        ])
        .expect("Parse failed");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/rules.toml")));
    }

    #[test]
    fn test_cli_rejects_unknown_action() {
        assert!(Cli::try_parse_from(["extidy", "/tmp/target", "explode"]).is_err());
    }
}
