//! Tail session: drives a log panel against a push channel
//!
//! The session task is the only owner of the [`LogPanel`]. The UI talks to
//! it through a [`SessionHandle`]: commands go in over an mpsc channel,
//! rendered snapshots come out over a watch channel and error notices over a
//! broadcast channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::channel::PushChannel;
use crate::cursor::Cursors;
use crate::entry::LogStream;
use crate::error::ChannelError;
use crate::notice::Notice;
use crate::panel::{LogPanel, PanelUpdate};
use crate::protocol::ClientRequest;
use crate::view::{RenderedLog, RenderedNode};

/// Interval between "anything newer" requests
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

const COMMAND_BUFFER: usize = 16;
const NOTICE_BUFFER: usize = 32;

/// Commands accepted by a running session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionCommand {
    /// Ask for older entries regardless of the scroll offset
    Backfill,
    /// The viewport scrolled to this offset from the top
    Scrolled(f64),
    Shutdown,
}

/// What the UI renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub stream: LogStream,
    pub nodes: Vec<RenderedNode>,
    pub cursors: Cursors,
    pub backfill_pending: bool,
    /// Bumped whenever older entries were prepended
    pub backfill_generation: u64,
}

impl SessionSnapshot {
    fn of(panel: &LogPanel<RenderedLog>, backfill_generation: u64) -> Self {
        Self {
            stream: panel.stream(),
            nodes: panel.view().snapshot(),
            cursors: panel.cursors(),
            backfill_pending: panel.backfill_pending(),
            backfill_generation,
        }
    }
}

/// Cloneable handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    notices: broadcast::Sender<Notice>,
}

impl SessionHandle {
    pub async fn request_backfill(&self) {
        if self.commands.send(SessionCommand::Backfill).await.is_err() {
            debug!("backfill requested after session stopped");
        }
    }

    /// Report the viewport's scroll offset; reaching the top asks for older
    /// entries
    pub async fn report_scroll(&self, offset: f64) {
        if self.commands.send(SessionCommand::Scrolled(offset)).await.is_err() {
            debug!("scroll reported after session stopped");
        }
    }

    pub async fn shutdown(&self) {
        let _ = self.commands.send(SessionCommand::Shutdown).await;
    }

    /// Latest snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }
}

/// A live tail over one panel and one channel
pub struct TailSession<C: PushChannel + 'static> {
    channel: Arc<C>,
    panel: LogPanel<RenderedLog>,
    poll_interval: Duration,
}

impl<C: PushChannel + 'static> TailSession<C> {
    pub fn new(channel: C, panel: LogPanel<RenderedLog>) -> Self {
        Self {
            channel: Arc::new(channel),
            panel,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Spawn the session on the current tokio runtime
    pub fn spawn(self) -> (SessionHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::of(&self.panel, 0));
        let (notice_tx, _) = broadcast::channel(NOTICE_BUFFER);

        let handle = SessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            notices: notice_tx.clone(),
        };
        let task = tokio::spawn(self.run(command_rx, snapshot_tx, notice_tx));
        (handle, task)
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        snapshots: watch::Sender<SessionSnapshot>,
        notices: broadcast::Sender<Notice>,
    ) {
        let stream = self.panel.stream();
        info!(%stream, interval_ms = self.poll_interval.as_millis() as u64, "tail session started");

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut backfill_generation = 0u64;
        let channel = Arc::clone(&self.channel);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let request = self.panel.tail_request();
                    if !self.emit(request, &notices).await {
                        break;
                    }
                }
                command = commands.recv() => match command {
                    Some(SessionCommand::Backfill | SessionCommand::Scrolled(_)) => {
                        let request = match command {
                            Some(SessionCommand::Scrolled(offset)) => self.panel.on_scroll(offset),
                            _ => self.panel.backfill_request(),
                        };
                        if let Some(request) = request {
                            debug!(%stream, ?request, "requesting older entries");
                            if !self.emit(request, &notices).await {
                                break;
                            }
                            publish(&snapshots, &self.panel, backfill_generation);
                        }
                    }
                    Some(SessionCommand::Shutdown) | None => break,
                },
                event = channel.next_event() => match event {
                    Ok(event) => {
                        let update = self.panel.handle(event);
                        if let PanelUpdate::Backfill { prepended } = update {
                            if prepended > 0 {
                                backfill_generation += 1;
                            }
                        }
                        if let PanelUpdate::Failed { message } = &update {
                            let _ = notices.send(Notice::error(message.clone()));
                        }
                        if update != PanelUpdate::Ignored {
                            publish(&snapshots, &self.panel, backfill_generation);
                        }
                    }
                    Err(ChannelError::Closed) => {
                        warn!(%stream, "push channel closed");
                        let _ = notices.send(Notice::error("Connection to the log server was lost"));
                        break;
                    }
                    Err(e) => warn!(%stream, error = %e, "dropping undecodable event"),
                },
            }
        }

        info!(%stream, "tail session stopped");
    }

    /// Emit a request; false when the channel is gone
    async fn emit(&self, request: ClientRequest, notices: &broadcast::Sender<Notice>) -> bool {
        match self.channel.emit(request).await {
            Ok(()) => true,
            Err(ChannelError::Closed) => {
                warn!(stream = %self.panel.stream(), "push channel closed while emitting");
                let _ = notices.send(Notice::error("Connection to the log server was lost"));
                false
            }
            Err(e) => {
                warn!(stream = %self.panel.stream(), error = %e, "emit failed");
                let _ = notices.send(Notice::error(e.to_string()));
                true
            }
        }
    }
}

fn publish(snapshots: &watch::Sender<SessionSnapshot>, panel: &LogPanel<RenderedLog>, generation: u64) {
    let next = SessionSnapshot::of(panel, generation);
    snapshots.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}
