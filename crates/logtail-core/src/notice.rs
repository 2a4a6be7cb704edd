//! Transient on-screen notifications

use std::fmt;
use std::time::Duration;

/// How long login notices stay on screen
pub const LOGIN_NOTICE_DURATION: Duration = Duration::from_millis(3000);

/// How long composer notices stay on screen
pub const SEND_NOTICE_DURATION: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A toast shown for a fixed duration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub duration: Duration,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
            duration: LOGIN_NOTICE_DURATION,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
            duration: LOGIN_NOTICE_DURATION,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Success notice with the server's message, or error notice with the
    /// failure's display text
    pub fn from_result<E: fmt::Display>(result: &Result<String, E>) -> Self {
        match result {
            Ok(message) => Notice::success(message.clone()),
            Err(e) => Notice::error(e.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}
