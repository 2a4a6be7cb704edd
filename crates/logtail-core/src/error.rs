//! Error types for logtail-core

use thiserror::Error;

/// Errors raised while decoding or applying channel traffic
#[derive(Debug, Error)]
pub enum CoreError {
    /// A frame named an event this client does not understand
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// Payload did not match the expected shape
    #[error("invalid payload for {event}: {reason}")]
    InvalidPayload { event: String, reason: String },

    /// Feed file could not be read
    #[error("feed io error: {0}")]
    FeedIo(#[from] std::io::Error),

    /// Feed storage lock was poisoned
    #[error("feed storage error: {0}")]
    Storage(String),

    /// A feed line was not a valid entry
    #[error("feed line {line}: {reason}")]
    FeedLine { line: usize, reason: String },
}

/// Errors raised by a push channel
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The other end went away
    #[error("channel closed")]
    Closed,

    /// The transport failed to deliver a frame
    #[error("send failed: {0}")]
    SendFailed(String),

    /// An inbound frame could not be decoded
    #[error(transparent)]
    Decode(#[from] CoreError),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;
