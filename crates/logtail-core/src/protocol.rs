//! Named-event frames exchanged over the push channel
//!
//! Every frame is an event name plus a JSON payload. The client emits
//! [`ClientRequest`]s carrying a single cursor id; the server answers with
//! [`ServerEvent`]s carrying a batch of entries and the id the client should
//! remember next.
//!
//! The batch `data` field arrives as a JSON-encoded string (the server
//! serialises the list before emitting it). Plain arrays are accepted too.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entry::{EntryId, LogEntry, LogStream};
use crate::error::{CoreError, CoreResult};

/// Event name for an empty answer
pub const NO_NEW_DATA_EVENT: &str = "no_new_data";

/// Event name for a server-side failure
pub const ERROR_EVENT: &str = "error";

/// A raw named event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    pub payload: Value,
}

impl Frame {
    pub fn new(event: impl Into<String>, payload: Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }
}

/// A batch of entries plus the cursor value that accompanies it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Batch {
    pub entries: Vec<LogEntry>,
    pub new_id: EntryId,
}

impl Batch {
    pub fn new(entries: Vec<LogEntry>, new_id: EntryId) -> Self {
        Self { entries, new_id }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum BatchData {
    Encoded(String),
    Entries(Vec<LogEntry>),
}

#[derive(Debug, Serialize, Deserialize)]
struct BatchPayload {
    data: BatchData,
    new_id: EntryId,
}

#[derive(Debug, Serialize, Deserialize)]
struct MessagePayload {
    #[serde(default)]
    message: String,
}

/// Events pushed by the server
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Entries newer than the client's max cursor
    Tail { stream: LogStream, batch: Batch },
    /// Entries older than the client's min cursor, newest first
    Backfill { stream: LogStream, batch: Batch },
    /// Nothing matched the last request
    NoNewData { message: String },
    /// The server rejected or failed the last request
    Error { message: String },
}

impl ServerEvent {
    /// Decode an inbound frame
    pub fn from_frame(frame: &Frame) -> CoreResult<Self> {
        let event = frame.event.as_str();
        let batch_for = |stream| decode_batch(frame).map(|batch| (stream, batch));

        match event {
            "message" => batch_for(LogStream::Chat).map(|(stream, batch)| Self::Tail { stream, batch }),
            "message_com" => {
                batch_for(LogStream::Common).map(|(stream, batch)| Self::Tail { stream, batch })
            }
            "update_old_log" => {
                batch_for(LogStream::Chat).map(|(stream, batch)| Self::Backfill { stream, batch })
            }
            "update_old_log_com" => {
                batch_for(LogStream::Common).map(|(stream, batch)| Self::Backfill { stream, batch })
            }
            NO_NEW_DATA_EVENT => Ok(Self::NoNewData {
                message: decode_message(frame)?,
            }),
            ERROR_EVENT => Ok(Self::Error {
                message: decode_message(frame)?,
            }),
            other => Err(CoreError::UnknownEvent(other.to_string())),
        }
    }

    /// Encode as the server would emit it
    pub fn to_frame(&self) -> CoreResult<Frame> {
        match self {
            Self::Tail { stream, batch } => encode_batch(stream.tail_event(), batch),
            Self::Backfill { stream, batch } => encode_batch(stream.backfill_event(), batch),
            Self::NoNewData { message } => Ok(Frame::new(
                NO_NEW_DATA_EVENT,
                serde_json::json!({ "message": message }),
            )),
            Self::Error { message } => Ok(Frame::new(
                ERROR_EVENT,
                serde_json::json!({ "message": message }),
            )),
        }
    }

    /// Stream this event belongs to, if it carries entries
    pub fn stream(&self) -> Option<LogStream> {
        match self {
            Self::Tail { stream, .. } | Self::Backfill { stream, .. } => Some(*stream),
            Self::NoNewData { .. } | Self::Error { .. } => None,
        }
    }
}

fn decode_batch(frame: &Frame) -> CoreResult<Batch> {
    let invalid = |reason: String| CoreError::InvalidPayload {
        event: frame.event.clone(),
        reason,
    };

    let payload: BatchPayload =
        serde_json::from_value(frame.payload.clone()).map_err(|e| invalid(e.to_string()))?;

    let entries = match payload.data {
        BatchData::Entries(entries) => entries,
        BatchData::Encoded(text) => {
            serde_json::from_str::<Vec<LogEntry>>(&text).map_err(|e| invalid(format!("data is not an entry list: {e}")))?
        }
    };

    Ok(Batch::new(entries, payload.new_id))
}

fn encode_batch(event: &str, batch: &Batch) -> CoreResult<Frame> {
    let data = serde_json::to_string(&batch.entries).map_err(|e| CoreError::InvalidPayload {
        event: event.to_string(),
        reason: e.to_string(),
    })?;
    let payload = BatchPayload {
        data: BatchData::Encoded(data),
        new_id: batch.new_id,
    };
    let payload = serde_json::to_value(payload).map_err(|e| CoreError::InvalidPayload {
        event: event.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Frame::new(event, payload))
}

fn decode_message(frame: &Frame) -> CoreResult<String> {
    serde_json::from_value::<MessagePayload>(frame.payload.clone())
        .map(|p| p.message)
        .map_err(|e| CoreError::InvalidPayload {
            event: frame.event.clone(),
            reason: e.to_string(),
        })
}

/// Requests emitted by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientRequest {
    /// Ask for entries with id greater than `after`
    Tail { stream: LogStream, after: EntryId },
    /// Ask for entries with id less than `before`
    Backfill { stream: LogStream, before: EntryId },
}

impl ClientRequest {
    pub fn stream(&self) -> LogStream {
        match self {
            Self::Tail { stream, .. } | Self::Backfill { stream, .. } => *stream,
        }
    }

    pub fn to_frame(&self) -> Frame {
        match self {
            Self::Tail { stream, after } => Frame::new(stream.tail_request_event(), Value::from(*after)),
            Self::Backfill { stream, before } => {
                Frame::new(stream.backfill_event(), Value::from(*before))
            }
        }
    }

    /// Decode a request frame. The cursor must be a non-negative integer.
    pub fn from_frame(frame: &Frame) -> CoreResult<Self> {
        let cursor = || {
            frame.payload.as_u64().ok_or_else(|| CoreError::InvalidPayload {
                event: frame.event.clone(),
                reason: format!("expected an integer id, got {}", frame.payload),
            })
        };

        match frame.event.as_str() {
            "data_get" => Ok(Self::Tail { stream: LogStream::Chat, after: cursor()? }),
            "data_get_com" => Ok(Self::Tail { stream: LogStream::Common, after: cursor()? }),
            "update_old_log" => Ok(Self::Backfill { stream: LogStream::Chat, before: cursor()? }),
            "update_old_log_com" => Ok(Self::Backfill {
                stream: LogStream::Common,
                before: cursor()?,
            }),
            other => Err(CoreError::UnknownEvent(other.to_string())),
        }
    }
}
