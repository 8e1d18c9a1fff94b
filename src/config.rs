//! Exclusion-rule configuration.
//!
//! Files matched by any rule are left untouched by `organize`. Rules are
//! read from `.extidyrc.toml` inside the target directory, then from
//! `~/.config/extidy/config.toml`, and fall back to defaults (hidden
//! files excluded, nothing else).
//!
//! ```toml
//! [exclude]
//! names = ["Thumbs.db"]
//! extensions = ["tmp", "partial"]
//! patterns = ["*.crdownload"]
//! regex = ['^~\$']
//! organize_hidden = false
//! ```

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-directory configuration file.
pub const CONFIG_FILE_NAME: &str = ".extidyrc.toml";

/// Errors that can occur while loading or compiling exclusion rules.
#[derive(Debug)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    NotFound(PathBuf),
    /// The configuration file could not be read.
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for this schema.
    Invalid { path: PathBuf, reason: String },
    /// An exclusion glob pattern does not compile.
    BadGlob(String),
    /// An exclusion regex does not compile.
    BadRegex { pattern: String, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            Self::Unreadable { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            Self::Invalid { path, reason } => {
                write!(f, "Invalid configuration {}: {}", path.display(), reason)
            }
            Self::BadGlob(pattern) => write!(f, "Invalid glob pattern '{}'", pattern),
            Self::BadRegex { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Exclusion rules as they appear in the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeConfig {
    #[serde(default)]
    pub exclude: ExcludeRules,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names to leave in place.
    #[serde(default)]
    pub names: Vec<String>,
    /// Extensions (without the dot, case-insensitive) to leave in place.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Glob patterns matched against the file name.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
    /// Whether hidden files (leading `.`) may be organized. Off by
    /// default; the tool's own dotfiles are excluded regardless.
    #[serde(default)]
    pub organize_hidden: bool,
}

impl ExcludeConfig {
    /// Loads rules for a target directory.
    ///
    /// An explicit `config_path` must exist; otherwise the target
    /// directory's own `.extidyrc.toml` is tried, then
    /// `~/.config/extidy/config.toml`, then defaults.
    pub fn load(dir: &Path, config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }

        let local = dir.join(CONFIG_FILE_NAME);
        if local.exists() {
            return Self::load_from_file(&local);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("extidy")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Compiles the rules into matchers; invalid patterns fail here, not
    /// per file.
    pub fn compile(self) -> Result<CompiledExclusions, ConfigError> {
        CompiledExclusions::new(self.exclude)
    }
}

/// Pre-compiled exclusion matchers.
pub struct CompiledExclusions {
    names: HashSet<String>,
    extensions: HashSet<String>,
    patterns: Vec<Pattern>,
    regexes: Vec<Regex>,
    organize_hidden: bool,
}

impl CompiledExclusions {
    fn new(rules: ExcludeRules) -> Result<Self, ConfigError> {
        let patterns = rules
            .patterns
            .iter()
            .map(|p| Pattern::new(p).map_err(|_| ConfigError::BadGlob(p.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let regexes = rules
            .regex
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::BadRegex {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            names: rules.names.into_iter().collect(),
            extensions: rules
                .extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            patterns,
            regexes,
            organize_hidden: rules.organize_hidden,
        })
    }

    /// Matchers with no user rules; hidden files still excluded.
    pub fn defaults() -> Self {
        Self {
            names: HashSet::new(),
            extensions: HashSet::new(),
            patterns: Vec::new(),
            regexes: Vec::new(),
            organize_hidden: false,
        }
    }

    /// True when `organize` must leave this file name in place.
    pub fn is_excluded(&self, file_name: &str) -> bool {
        if !self.organize_hidden && file_name.starts_with('.') {
            return true;
        }
        if self.names.contains(file_name) {
            return true;
        }
        if let Some(ext) = crate::extension::destination_dir(file_name)
            && self.extensions.contains(&ext)
        {
            return true;
        }
        if self.patterns.iter().any(|p| p.matches(file_name)) {
            return true;
        }
        self.regexes.iter().any(|r| r.is_match(file_name))
    }
}
