//! Log entries and the streams they belong to

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Avatar shown when the server has no picture for an author yet
pub const DEFAULT_AVATAR: &str = "default.jpg";

/// Path prefix under which the server publishes avatars
pub const AVATAR_PREFIX: &str = "/static/img/";

/// Identifier of a log entry. Strictly increasing and unique per stream.
pub type EntryId = u64;

/// One line of a log stream as delivered by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Monotonic id
    pub id: EntryId,
    /// Display timestamp (the server sends `HH:MM`)
    #[serde(rename = "t")]
    pub timestamp: String,
    /// Author of a chat line
    #[serde(rename = "who_string", default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Line text
    #[serde(rename = "log_string")]
    pub text: String,
    /// Avatar file name relative to the avatar directory
    #[serde(rename = "img_path", default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl LogEntry {
    /// Create a plain log line without author or avatar
    pub fn new(id: EntryId, timestamp: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            timestamp: timestamp.into(),
            author: None,
            text: text.into(),
            avatar: None,
        }
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the avatar file name
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Source URL of the avatar, falling back to the default picture
    pub fn avatar_src(&self) -> String {
        let file = self.avatar.as_deref().unwrap_or(DEFAULT_AVATAR);
        format!("{AVATAR_PREFIX}{file}")
    }
}

/// The two log streams the server publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    /// Player chat, rendered with avatar and author
    #[default]
    Chat,
    /// Server log, rendered as single lines
    Common,
}

impl LogStream {
    /// Event the client emits to ask for newer entries
    pub fn tail_request_event(self) -> &'static str {
        match self {
            LogStream::Chat => "data_get",
            LogStream::Common => "data_get_com",
        }
    }

    /// Event the server pushes with newer entries
    pub fn tail_event(self) -> &'static str {
        match self {
            LogStream::Chat => "message",
            LogStream::Common => "message_com",
        }
    }

    /// Event used in both directions for older entries
    pub fn backfill_event(self) -> &'static str {
        match self {
            LogStream::Chat => "update_old_log",
            LogStream::Common => "update_old_log_com",
        }
    }

    /// The other stream
    pub fn other(self) -> Self {
        match self {
            LogStream::Chat => LogStream::Common,
            LogStream::Common => LogStream::Chat,
        }
    }
}

impl fmt::Display for LogStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogStream::Chat => f.write_str("chat"),
            LogStream::Common => f.write_str("common"),
        }
    }
}

impl FromStr for LogStream {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(LogStream::Chat),
            "common" | "com" => Ok(LogStream::Common),
            other => Err(format!("unknown stream `{other}` (expected chat or common)")),
        }
    }
}
