//! What the logtail binaries log, and where
//!
//! | variable | field |
//! |---|---|
//! | `LOGTAIL_LOG_LEVEL` | `level` |
//! | `LOGTAIL_LOG_DIR` | `file` (daily JSONL files in that directory) |
//!
//! `RUST_LOG` still wins over `level` when set.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Prefix of the files written under the log directory
pub const LOG_FILE_PREFIX: &str = "logtail";

/// Crates whose events pass the level filter; everything else stays at `warn`
const LOGTAIL_TARGETS: [&str; 4] = ["logtail_core", "logtail_client", "logtail_viewer", "logtail_logging"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level for the logtail crates
    pub level: String,
    pub console: ConsoleFormat,
    /// JSONL file output, off unless a log directory is given
    pub file: Option<FileConfig>,
    /// Source file and line on every JSON event
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: ConsoleFormat::Json,
            file: None,
            include_location: true,
        }
    }
}

impl LogConfig {
    /// Desktop viewer: JSON lines on stderr, or readable debug output with
    /// `verbose`
    pub fn viewer(verbose: bool) -> Self {
        if verbose {
            Self {
                level: "debug".to_string(),
                console: ConsoleFormat::Pretty,
                ..Self::default()
            }
        } else {
            Self::default()
        }
    }

    /// Warnings only, no location noise
    pub fn testing() -> Self {
        Self {
            level: "warn".to_string(),
            include_location: false,
            ..Self::default()
        }
    }

    /// Also write daily-rotated JSONL files to `directory`
    pub fn with_log_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.file = Some(FileConfig {
            directory: directory.into(),
            prefix: LOG_FILE_PREFIX.to_string(),
            rotation: RotationStrategy::Daily,
        });
        self
    }

    /// Apply `LOGTAIL_LOG_LEVEL` and `LOGTAIL_LOG_DIR` from `lookup`
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(level) = lookup("LOGTAIL_LOG_LEVEL").filter(|l| !l.trim().is_empty()) {
            self.level = level.trim().to_lowercase();
        }
        if let Some(dir) = lookup("LOGTAIL_LOG_DIR").filter(|d| !d.trim().is_empty()) {
            self = self.with_log_dir(dir);
        }
        self
    }

    /// Directive string handed to the env filter when RUST_LOG is unset.
    /// Dependency crates stay at `warn` unless the level is `trace`.
    pub fn filter_directives(&self) -> String {
        if self.level == "trace" {
            return self.level.clone();
        }
        let mut directives = String::from("warn");
        for target in LOGTAIL_TARGETS {
            directives.push_str(&format!(",{target}={}", self.level));
        }
        directives
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable with colours
    Pretty,
    Off,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    pub directory: PathBuf,
    pub prefix: String,
    pub rotation: RotationStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationStrategy {
    /// `<prefix>.<date>` files, one per day
    #[default]
    Daily,
    /// A single `<prefix>.log`, truncated at startup
    Never,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_presets() {
        let quiet = LogConfig::viewer(false);
        assert_eq!(quiet.level, "info");
        assert_eq!(quiet.console, ConsoleFormat::Json);
        assert!(quiet.file.is_none());

        let verbose = LogConfig::viewer(true);
        assert_eq!(verbose.level, "debug");
        assert_eq!(verbose.console, ConsoleFormat::Pretty);
    }

    #[test]
    fn test_env_overrides_enable_file_output() {
        let config = LogConfig::viewer(false).with_env_overrides(|key| match key {
            "LOGTAIL_LOG_LEVEL" => Some(" DEBUG ".to_string()),
            "LOGTAIL_LOG_DIR" => Some("/var/log/logtail".to_string()),
            _ => None,
        });
        assert_eq!(config.level, "debug");
        let file = config.file.unwrap();
        assert_eq!(file.directory, PathBuf::from("/var/log/logtail"));
        assert_eq!(file.prefix, LOG_FILE_PREFIX);
        assert_eq!(file.rotation, RotationStrategy::Daily);

        let untouched = LogConfig::testing().with_env_overrides(|_| Some(String::new()));
        assert_eq!(untouched, LogConfig::testing());
    }

    #[test]
    fn test_filter_directives() {
        let directives = LogConfig::viewer(true).filter_directives();
        assert_eq!(
            directives,
            "warn,logtail_core=debug,logtail_client=debug,logtail_viewer=debug,logtail_logging=debug"
        );

        let config = LogConfig {
            level: "trace".to_string(),
            ..LogConfig::default()
        };
        assert_eq!(config.filter_directives(), "trace");
    }

    #[test]
    fn test_partial_config_deserializes() {
        let config: LogConfig = serde_json::from_str(r#"{"console": "off", "level": "error"}"#).unwrap();
        assert_eq!(config.console, ConsoleFormat::Off);
        assert_eq!(config.level, "error");
        assert!(config.include_location);
    }
}
