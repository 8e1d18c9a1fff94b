//! Console output helpers.
//!
//! All user-facing printing goes through [`OutputFormatter`] so styling
//! stays consistent: green ✓ for success, red ✗ for per-file failures,
//! yellow ⚠ for skips and caveats.

use crate::backup::SessionSummary;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct OutputFormatter;

impl OutputFormatter {
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Spinner for operations without a known item count.
    pub fn spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid spinner template"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Table of recorded sessions, oldest first, numbered the way
    /// `restore` and `delete` select them.
    pub fn session_table(sessions: &[SessionSummary]) {
        Self::header("Recorded sessions");
        for (i, session) in sessions.iter().enumerate() {
            let file_word = if session.files == 1 { "file" } else { "files" };
            println!(
                "{:3}. {}  {} ({} {})",
                i + 1,
                session.timestamp.bold(),
                session.kind,
                session.files.to_string().green(),
                file_word
            );
        }
    }
}
