//! Error types for logtail-client

use std::path::PathBuf;

use logtail_core::LoginValidation;
use thiserror::Error;

/// Failures of an HTTP call. Every variant is shown to the user as a notice.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally before any request was made
    #[error(transparent)]
    Validation(#[from] LoginValidation),

    /// Empty composer input
    #[error("Please enter a message")]
    EmptyMessage,

    /// Another message is still being sent
    #[error("A message is already being sent")]
    SendInFlight,

    /// Non-success HTTP status
    #[error("HTTP error! Status: {status}")]
    Http { status: u16 },

    /// Request never completed
    #[error("Network error: {0}")]
    Network(String),

    /// Body was not the expected JSON
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Server answered with a non-zero status
    #[error("{message}")]
    Rejected { status: i64, message: String },

    /// Base URL could not be parsed
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Whether the failure happened before the network was touched
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::Validation(_) | ClientError::EmptyMessage | ClientError::SendInFlight
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ClientError::Http {
                status: status.as_u16(),
            }
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value `{value}` for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Result type for HTTP operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;
