//! Push channel abstraction
//!
//! The [`PushChannel`] trait is the only thing the tail session knows about
//! the transport. The real transport is external; [`LocalChannel`] is an
//! in-process duplex used by tests and by the offline viewer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use logtail_core::{LocalChannel, PushChannel, ClientRequest, LogStream};
//!
//! let (client, server) = LocalChannel::pair();
//! client.emit(ClientRequest::Tail { stream: LogStream::Chat, after: 0 }).await?;
//! let frame = server.recv_frame().await?;
//! assert_eq!(frame.event, "data_get");
//! ```

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use crate::error::{ChannelError, ChannelResult};
use crate::protocol::{ClientRequest, Frame, ServerEvent};

/// Default buffer of each direction of a local channel
pub const LOCAL_CHANNEL_BUFFER: usize = 256;

/// A bidirectional named-event channel to the server
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// Emit a request to the server
    async fn emit(&self, request: ClientRequest) -> ChannelResult<()>;

    /// Wait for the next event pushed by the server
    ///
    /// Frames that cannot be decoded are reported as
    /// [`ChannelError::Decode`]; the channel stays usable afterwards.
    async fn next_event(&self) -> ChannelResult<ServerEvent>;
}

/// Client end of an in-process channel
pub struct LocalChannel {
    outgoing: mpsc::Sender<Frame>,
    inbox: Mutex<mpsc::Receiver<Frame>>,
}

/// Server end of an in-process channel
pub struct LocalServerEnd {
    requests: Mutex<mpsc::Receiver<Frame>>,
    events: mpsc::Sender<Frame>,
}

impl LocalChannel {
    /// Create a connected client/server pair
    pub fn pair() -> (LocalChannel, LocalServerEnd) {
        Self::pair_with_buffer(LOCAL_CHANNEL_BUFFER)
    }

    pub fn pair_with_buffer(buffer: usize) -> (LocalChannel, LocalServerEnd) {
        let (request_tx, request_rx) = mpsc::channel(buffer);
        let (event_tx, event_rx) = mpsc::channel(buffer);
        (
            LocalChannel {
                outgoing: request_tx,
                inbox: Mutex::new(event_rx),
            },
            LocalServerEnd {
                requests: Mutex::new(request_rx),
                events: event_tx,
            },
        )
    }
}

#[async_trait]
impl PushChannel for LocalChannel {
    async fn emit(&self, request: ClientRequest) -> ChannelResult<()> {
        self.outgoing
            .send(request.to_frame())
            .await
            .map_err(|_| ChannelError::Closed)
    }

    async fn next_event(&self) -> ChannelResult<ServerEvent> {
        let frame = self
            .inbox
            .lock()
            .await
            .recv()
            .await
            .ok_or(ChannelError::Closed)?;
        Ok(ServerEvent::from_frame(&frame)?)
    }
}

impl LocalServerEnd {
    /// Wait for the next raw request frame
    pub async fn recv_frame(&self) -> ChannelResult<Frame> {
        self.requests
            .lock()
            .await
            .recv()
            .await
            .ok_or(ChannelError::Closed)
    }

    /// Push an event to the client
    pub async fn send(&self, event: &ServerEvent) -> ChannelResult<()> {
        let frame = event.to_frame()?;
        self.send_frame(frame).await
    }

    /// Push a raw frame to the client
    pub async fn send_frame(&self, frame: Frame) -> ChannelResult<()> {
        self.events.send(frame).await.map_err(|_| ChannelError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{LogEntry, LogStream};
    use crate::protocol::Batch;

    #[tokio::test]
    async fn test_request_reaches_server_end() {
        let (client, server) = LocalChannel::pair();
        client
            .emit(ClientRequest::Backfill { stream: LogStream::Common, before: 30 })
            .await
            .unwrap();

        let frame = server.recv_frame().await.unwrap();
        assert_eq!(frame.event, "update_old_log_com");
        assert_eq!(frame.payload, serde_json::json!(30));
    }

    #[tokio::test]
    async fn test_event_reaches_client() {
        let (client, server) = LocalChannel::pair();
        let event = ServerEvent::Tail {
            stream: LogStream::Chat,
            batch: Batch::new(vec![LogEntry::new(1, "10:00", "hello")], 1),
        };
        server.send(&event).await.unwrap();
        assert_eq!(client.next_event().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_next_event_waits_for_server() {
        let (client, server) = LocalChannel::pair();
        let mut next = tokio_test::task::spawn(client.next_event());
        tokio_test::assert_pending!(next.poll());

        server
            .send(&ServerEvent::Error { message: "max_id error!".into() })
            .await
            .unwrap();
        assert!(next.is_woken());
        let event = tokio_test::assert_ready_ok!(next.poll());
        assert_eq!(event, ServerEvent::Error { message: "max_id error!".into() });
    }

    #[tokio::test]
    async fn test_undecodable_frame_keeps_channel_open() {
        let (client, server) = LocalChannel::pair();
        server
            .send_frame(Frame::new("connect", serde_json::Value::Null))
            .await
            .unwrap();
        server
            .send(&ServerEvent::NoNewData { message: "No new data".into() })
            .await
            .unwrap();

        assert!(matches!(client.next_event().await, Err(ChannelError::Decode(_))));
        assert!(matches!(
            client.next_event().await,
            Ok(ServerEvent::NoNewData { .. })
        ));
    }

    #[tokio::test]
    async fn test_dropped_server_end_closes_channel() {
        let (client, server) = LocalChannel::pair();
        drop(server);
        assert!(matches!(client.next_event().await, Err(ChannelError::Closed)));
        assert!(matches!(
            client.emit(ClientRequest::Tail { stream: LogStream::Chat, after: 0 }).await,
            Err(ChannelError::Closed)
        ));
    }
}
