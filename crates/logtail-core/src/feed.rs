//! In-memory log feed answering channel requests
//!
//! [`MemoryFeed`] holds both streams and answers tail and backfill requests
//! with the same paging rules as the log server: at most
//! [`FEED_PAGE_LIMIT`] entries per answer, tail answers carry the newest
//! entries above the cursor in ascending order, backfill answers are newest
//! first, and `no_new_data` when nothing matched.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::channel::LocalServerEnd;
use crate::entry::{EntryId, LogEntry, LogStream};
use crate::error::{ChannelError, CoreError, CoreResult};
use crate::protocol::{Batch, ClientRequest, Frame, ServerEvent};

/// Maximum entries in one tail or backfill answer
pub const FEED_PAGE_LIMIT: usize = 10;

/// Entries shown when a panel is first opened
pub const INITIAL_PAGE_SIZE: usize = 20;

const NO_NEW_DATA: &str = "No new data";
const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Deserialize)]
struct FeedLine {
    #[serde(default)]
    stream: LogStream,
    #[serde(flatten)]
    entry: LogEntry,
}

/// Both log streams held in memory
#[derive(Debug, Default)]
pub struct MemoryFeed {
    streams: RwLock<HashMap<LogStream, BTreeMap<EntryId, LogEntry>>>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON-lines file. Each line is an entry with an optional
    /// `stream` field (`chat` when absent). Blank lines are skipped.
    pub fn load_jsonl(path: impl AsRef<Path>) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let feed = Self::new();
        let mut count = 0usize;

        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let parsed: FeedLine = serde_json::from_str(line).map_err(|e| CoreError::FeedLine {
                line: index + 1,
                reason: e.to_string(),
            })?;
            feed.insert(parsed.stream, parsed.entry)?;
            count += 1;
        }

        info!(path = %path.as_ref().display(), entries = count, "loaded feed");
        Ok(feed)
    }

    /// Store an entry, replacing any entry with the same id
    pub fn insert(&self, stream: LogStream, entry: LogEntry) -> CoreResult<()> {
        let mut streams = self
            .streams
            .write()
            .map_err(|_| CoreError::Storage("failed to acquire write lock".to_string()))?;
        streams.entry(stream).or_default().insert(entry.id, entry);
        Ok(())
    }

    /// Append a new entry stamped with the next id and the current local time
    pub fn push(
        &self,
        stream: LogStream,
        author: Option<&str>,
        text: impl Into<String>,
    ) -> CoreResult<LogEntry> {
        let mut streams = self
            .streams
            .write()
            .map_err(|_| CoreError::Storage("failed to acquire write lock".to_string()))?;
        let entries = streams.entry(stream).or_default();
        let id = entries.keys().next_back().map_or(1, |last| last + 1);

        let timestamp = chrono::Local::now().format("%H:%M").to_string();
        let mut entry = LogEntry::new(id, timestamp, text);
        if let Some(author) = author {
            entry = entry.with_author(author).with_avatar(format!("{author}.png"));
        }
        entries.insert(id, entry.clone());
        Ok(entry)
    }

    pub fn len(&self, stream: LogStream) -> usize {
        self.streams
            .read()
            .map(|streams| streams.get(&stream).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    /// The newest [`INITIAL_PAGE_SIZE`] entries, ascending
    pub fn initial_page(&self, stream: LogStream) -> CoreResult<Vec<LogEntry>> {
        let streams = self
            .streams
            .read()
            .map_err(|_| CoreError::Storage("failed to acquire read lock".to_string()))?;
        let Some(entries) = streams.get(&stream) else {
            return Ok(Vec::new());
        };
        let mut page: Vec<LogEntry> = entries.values().rev().take(INITIAL_PAGE_SIZE).cloned().collect();
        page.reverse();
        Ok(page)
    }

    /// Answer a decoded request
    pub fn answer(&self, request: ClientRequest) -> CoreResult<ServerEvent> {
        let streams = self
            .streams
            .read()
            .map_err(|_| CoreError::Storage("failed to acquire read lock".to_string()))?;
        let empty = BTreeMap::new();
        let entries = streams.get(&request.stream()).unwrap_or(&empty);

        let event = match request {
            ClientRequest::Tail { stream, after } => {
                // Newest page above the cursor, delivered ascending
                let mut newer: Vec<LogEntry> = entries
                    .range(after.saturating_add(1)..)
                    .rev()
                    .take(FEED_PAGE_LIMIT)
                    .map(|(_, e)| e.clone())
                    .collect();
                newer.reverse();
                match newer.last().map(|e| e.id) {
                    Some(new_id) => ServerEvent::Tail {
                        stream,
                        batch: Batch::new(newer, new_id),
                    },
                    None => no_new_data(),
                }
            }
            ClientRequest::Backfill { stream, before } => {
                let older: Vec<LogEntry> = entries
                    .range(..before)
                    .rev()
                    .take(FEED_PAGE_LIMIT)
                    .map(|(_, e)| e.clone())
                    .collect();
                match older.last().map(|e| e.id) {
                    Some(new_id) => ServerEvent::Backfill {
                        stream,
                        batch: Batch::new(older, new_id),
                    },
                    None => no_new_data(),
                }
            }
        };
        Ok(event)
    }

    /// Answer a raw request frame. Unknown events get no answer.
    pub fn respond(&self, frame: &Frame) -> Option<ServerEvent> {
        let request = match ClientRequest::from_frame(frame) {
            Ok(request) => request,
            Err(CoreError::UnknownEvent(name)) => {
                debug!(event = %name, "ignoring unknown request");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "rejecting malformed request");
                let message = if frame.event.starts_with("data_get") {
                    "max_id error!"
                } else {
                    "min_id error!"
                };
                return Some(ServerEvent::Error {
                    message: message.to_string(),
                });
            }
        };

        match self.answer(request) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(error = %e, "feed failed to answer");
                Some(ServerEvent::Error {
                    message: INTERNAL_ERROR.to_string(),
                })
            }
        }
    }

    /// Serve requests arriving on the server end of a local channel until
    /// either side closes
    pub async fn serve(self: Arc<Self>, end: LocalServerEnd) {
        loop {
            let frame = match end.recv_frame().await {
                Ok(frame) => frame,
                Err(ChannelError::Closed) => break,
                Err(e) => {
                    warn!(error = %e, "feed receive failed");
                    continue;
                }
            };
            let Some(event) = self.respond(&frame) else {
                continue;
            };
            if let Err(e) = end.send(&event).await {
                debug!(error = %e, "client went away");
                break;
            }
        }
        debug!("feed stopped serving");
    }
}

fn no_new_data() -> ServerEvent {
    ServerEvent::NoNewData {
        message: NO_NEW_DATA.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn feed_with(stream: LogStream, ids: impl IntoIterator<Item = EntryId>) -> MemoryFeed {
        let feed = MemoryFeed::new();
        for id in ids {
            feed.insert(stream, LogEntry::new(id, "00:00", format!("#{id}"))).unwrap();
        }
        feed
    }

    fn ids(event: &ServerEvent) -> Vec<EntryId> {
        match event {
            ServerEvent::Tail { batch, .. } | ServerEvent::Backfill { batch, .. } => {
                batch.entries.iter().map(|e| e.id).collect()
            }
            _ => Vec::new(),
        }
    }

    #[test]
    fn test_tail_answer_is_newest_page_ascending() {
        let feed = feed_with(LogStream::Chat, 1..=25);
        let event = feed
            .answer(ClientRequest::Tail { stream: LogStream::Chat, after: 5 })
            .unwrap();
        assert_eq!(ids(&event), (16..=25).collect::<Vec<_>>());
        match event {
            ServerEvent::Tail { batch, .. } => assert_eq!(batch.new_id, 25),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_short_tail_answer_returns_everything_newer() {
        let feed = feed_with(LogStream::Chat, 1..=25);
        let event = feed
            .answer(ClientRequest::Tail { stream: LogStream::Chat, after: 20 })
            .unwrap();
        assert_eq!(ids(&event), vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn test_backfill_answer_is_newest_first() {
        let feed = feed_with(LogStream::Common, 1..=30);
        let event = feed
            .answer(ClientRequest::Backfill { stream: LogStream::Common, before: 21 })
            .unwrap();
        assert_eq!(ids(&event), (11..=20).rev().collect::<Vec<_>>());
        match event {
            ServerEvent::Backfill { batch, .. } => assert_eq!(batch.new_id, 11),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_nothing_matched() {
        let feed = feed_with(LogStream::Chat, 1..=3);
        let event = feed
            .answer(ClientRequest::Tail { stream: LogStream::Chat, after: 3 })
            .unwrap();
        assert!(matches!(event, ServerEvent::NoNewData { .. }));

        let event = feed
            .answer(ClientRequest::Tail { stream: LogStream::Common, after: 0 })
            .unwrap();
        assert!(matches!(event, ServerEvent::NoNewData { .. }));
    }

    #[test]
    fn test_initial_page_is_newest_twenty() {
        let feed = feed_with(LogStream::Chat, 1..=50);
        let page = feed.initial_page(LogStream::Chat).unwrap();
        assert_eq!(page.len(), INITIAL_PAGE_SIZE);
        assert_eq!(page.first().unwrap().id, 31);
        assert_eq!(page.last().unwrap().id, 50);
    }

    #[test]
    fn test_push_assigns_next_id() {
        let feed = feed_with(LogStream::Chat, [4, 9]);
        let entry = feed.push(LogStream::Chat, Some("Steve"), "hello").unwrap();
        assert_eq!(entry.id, 10);
        assert_eq!(entry.avatar.as_deref(), Some("Steve.png"));
        assert_eq!(feed.len(LogStream::Chat), 3);

        let first = feed.push(LogStream::Common, None, "boot").unwrap();
        assert_eq!(first.id, 1);
    }

    #[test]
    fn test_malformed_request_gets_error() {
        let feed = feed_with(LogStream::Chat, 1..=3);
        let frame = Frame::new("data_get", serde_json::json!("abc"));
        assert_eq!(
            feed.respond(&frame),
            Some(ServerEvent::Error { message: "max_id error!".into() })
        );
        let frame = Frame::new("update_old_log", serde_json::json!(-1));
        assert_eq!(
            feed.respond(&frame),
            Some(ServerEvent::Error { message: "min_id error!".into() })
        );
        assert!(feed.respond(&Frame::new("ping", serde_json::Value::Null)).is_none());
    }

    #[test]
    fn test_load_jsonl() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id":1,"t":"09:00","log_string":"a","who_string":"Alex"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"stream":"common","id":1,"t":"09:01","log_string":"boot"}}"#).unwrap();
        writeln!(file, r#"{{"id":2,"t":"09:02","log_string":"b"}}"#).unwrap();

        let feed = MemoryFeed::load_jsonl(file.path()).unwrap();
        assert_eq!(feed.len(LogStream::Chat), 2);
        assert_eq!(feed.len(LogStream::Common), 1);
    }

    #[test]
    fn test_load_jsonl_reports_bad_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id":1,"t":"09:00","log_string":"a"}}"#).unwrap();
        writeln!(file, "not json").unwrap();

        let err = MemoryFeed::load_jsonl(file.path()).unwrap_err();
        assert!(matches!(err, CoreError::FeedLine { line: 2, .. }));
    }
}
