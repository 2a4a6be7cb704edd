//! Viewer configuration
//!
//! Loaded from a TOML file, then overridden by environment variables:
//!
//! | variable | field |
//! |---|---|
//! | `LOGTAIL_SERVER_URL` | `server.base_url` |
//! | `LOGTAIL_STREAM` | `tail.stream` |
//! | `LOGTAIL_POLL_MS` | `tail.poll_interval_ms` |
//! | `LOGTAIL_REPLAY` | `tail.replay_path` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use logtail_core::LogStream;
use logtail_core::notice::{LOGIN_NOTICE_DURATION, SEND_NOTICE_DURATION};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::login::REDIRECT_DELAY;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogtailConfig {
    pub server: ServerConfig,
    pub tail: TailConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the log server's HTTP endpoints
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:211".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailConfig {
    /// Stream shown when the viewer opens
    pub stream: LogStream,
    /// Interval between "anything newer" requests
    pub poll_interval_ms: u64,
    /// JSON-lines file served by the in-process feed
    pub replay_path: Option<PathBuf>,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            stream: LogStream::Chat,
            poll_interval_ms: 1000,
            replay_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub login_notice_ms: u64,
    pub send_notice_ms: u64,
    pub redirect_delay_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            login_notice_ms: LOGIN_NOTICE_DURATION.as_millis() as u64,
            send_notice_ms: SEND_NOTICE_DURATION.as_millis() as u64,
            redirect_delay_ms: REDIRECT_DELAY.as_millis() as u64,
        }
    }
}

impl LogtailConfig {
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// File (if given) then process environment
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// File (if given) then overrides from `lookup`
    pub fn load_with(path: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env_overrides(lookup)
    }

    /// Apply overrides from a variable lookup
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        if let Some(url) = lookup("LOGTAIL_SERVER_URL") {
            self.server.base_url = url;
        }
        if let Some(stream) = lookup("LOGTAIL_STREAM") {
            self.tail.stream = stream.parse().map_err(|reason| ConfigError::InvalidValue {
                key: "LOGTAIL_STREAM".to_string(),
                value: stream.clone(),
                reason,
            })?;
        }
        if let Some(ms) = lookup("LOGTAIL_POLL_MS") {
            let parsed: u64 = ms.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: "LOGTAIL_POLL_MS".to_string(),
                    value: ms.clone(),
                    reason: e.to_string(),
                }
            })?;
            self.tail.poll_interval_ms = parsed;
        }
        if let Some(path) = lookup("LOGTAIL_REPLAY") {
            self.tail.replay_path = Some(PathBuf::from(path));
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.tail.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "tail.poll_interval_ms".to_string(),
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.tail.poll_interval_ms)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.ui.redirect_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = LogtailConfig::default();
        assert_eq!(config.server.base_url, "http://127.0.0.1:211");
        assert_eq!(config.tail.stream, LogStream::Chat);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert!(config.tail.replay_path.is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config = LogtailConfig::from_toml_str(
            r#"
            [tail]
            stream = "common"
            poll_interval_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.tail.stream, LogStream::Common);
        assert_eq!(config.tail.poll_interval_ms, 250);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbase_url = \"https://logs.example.com\"").unwrap();
        let config = LogtailConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.base_url, "https://logs.example.com");

        let missing = LogtailConfig::from_file("/nonexistent/logtail.toml");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("LOGTAIL_SERVER_URL", "http://10.0.0.2:8080"),
            ("LOGTAIL_STREAM", "common"),
            ("LOGTAIL_POLL_MS", "500"),
            ("LOGTAIL_REPLAY", "/tmp/feed.jsonl"),
        ]);
        let config = LogtailConfig::default()
            .with_env_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.base_url, "http://10.0.0.2:8080");
        assert_eq!(config.tail.stream, LogStream::Common);
        assert_eq!(config.tail.poll_interval_ms, 500);
        assert_eq!(config.tail.replay_path, Some(PathBuf::from("/tmp/feed.jsonl")));
    }

    #[test]
    fn test_load_with_applies_environment_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tail]\nstream = \"common\"\npoll_interval_ms = 250").unwrap();

        let config = LogtailConfig::load_with(Some(file.path()), |key| {
            (key == "LOGTAIL_POLL_MS").then(|| "750".to_string())
        })
        .unwrap();
        assert_eq!(config.tail.stream, LogStream::Common);
        assert_eq!(config.tail.poll_interval_ms, 750);

        let config = LogtailConfig::load_with(None, |_| None).unwrap();
        assert_eq!(config, LogtailConfig::default());
    }

    #[test]
    fn test_invalid_env_values() {
        let err = LogtailConfig::default()
            .with_env_overrides(|key| (key == "LOGTAIL_POLL_MS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = LogtailConfig::default()
            .with_env_overrides(|key| (key == "LOGTAIL_POLL_MS").then(|| "0".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = LogtailConfig::default()
            .with_env_overrides(|key| (key == "LOGTAIL_STREAM").then(|| "audit".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
