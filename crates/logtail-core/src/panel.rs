//! The log panel view-controller
//!
//! A [`LogPanel`] owns one container of rendered nodes and the cursor state
//! for the stream shown in it. Two paths feed the container:
//!
//! - **Live tail**: [`ServerEvent::Tail`] batches are appended. Anything not
//!   newer than the last rendered node is dropped, so re-delivered batches
//!   never produce duplicates.
//! - **Backfill**: when the viewport reaches the top the panel asks for
//!   entries older than its low-water mark; [`ServerEvent::Backfill`] batches
//!   are prepended in the order received.

use tracing::{debug, trace, warn};

use crate::cursor::Cursors;
use crate::entry::{EntryId, LogEntry, LogStream};
use crate::protocol::{Batch, ClientRequest, ServerEvent};
use crate::view::{LogView, RenderedNode};

/// Result of applying a tail batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TailOutcome {
    pub appended: usize,
    pub dropped: usize,
}

/// What a server event did to the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelUpdate {
    Tail(TailOutcome),
    Backfill { prepended: usize },
    /// The server had nothing to send
    Idle,
    /// The server reported an error; shown to the user as a notice
    Failed { message: String },
    /// Event for another stream
    Ignored,
}

impl PanelUpdate {
    /// Whether the container changed
    pub fn changed(&self) -> bool {
        match self {
            PanelUpdate::Tail(outcome) => outcome.appended > 0,
            PanelUpdate::Backfill { prepended } => *prepended > 0,
            PanelUpdate::Idle | PanelUpdate::Failed { .. } | PanelUpdate::Ignored => false,
        }
    }
}

/// View-controller for one log stream
#[derive(Debug)]
pub struct LogPanel<V: LogView> {
    stream: LogStream,
    view: V,
    cursors: Cursors,
    backfill_pending: bool,
}

impl<V: LogView> LogPanel<V> {
    /// Create an empty panel
    pub fn new(stream: LogStream, view: V) -> Self {
        Self {
            stream,
            view,
            cursors: Cursors::default(),
            backfill_pending: false,
        }
    }

    /// Create a panel showing the initial page, ascending by id
    pub fn with_initial_page(stream: LogStream, mut view: V, page: &[LogEntry]) -> Self {
        for entry in page {
            view.append(RenderedNode::render(stream, entry));
        }
        Self {
            stream,
            view,
            cursors: Cursors::seeded_from(page),
            backfill_pending: false,
        }
    }

    pub fn stream(&self) -> LogStream {
        self.stream
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn cursors(&self) -> Cursors {
        self.cursors
    }

    pub fn backfill_pending(&self) -> bool {
        self.backfill_pending
    }

    /// The periodic "anything newer than max id" request
    pub fn tail_request(&self) -> ClientRequest {
        ClientRequest::Tail {
            stream: self.stream,
            after: self.cursors.max_seen(),
        }
    }

    /// Request entries older than the low-water mark.
    ///
    /// Returns `None` when nothing older can exist or a backfill is already
    /// in flight.
    pub fn backfill_request(&mut self) -> Option<ClientRequest> {
        if self.backfill_pending || !self.cursors.can_backfill() {
            return None;
        }
        self.backfill_pending = true;
        Some(ClientRequest::Backfill {
            stream: self.stream,
            before: self.cursors.min_seen(),
        })
    }

    /// Scroll handler: reaching offset zero triggers a backfill
    pub fn on_scroll(&mut self, offset: f64) -> Option<ClientRequest> {
        if offset <= 0.0 {
            self.backfill_request()
        } else {
            None
        }
    }

    /// Append every entry newer than the last rendered node
    pub fn apply_tail(&mut self, batch: Batch) -> TailOutcome {
        let mut outcome = TailOutcome::default();

        for entry in &batch.entries {
            if let Some(last) = self.view.last_rendered_id() {
                if entry.id <= last {
                    trace!(stream = %self.stream, id = entry.id, last, "dropping re-delivered entry");
                    outcome.dropped += 1;
                    continue;
                }
            }
            self.view.append(RenderedNode::render(self.stream, entry));
            self.cursors.advance_max(entry.id);
            if self.cursors.min_seen() == 0 {
                self.cursors.retreat_min(entry.id);
            }
            outcome.appended += 1;
        }
        self.cursors.advance_max(batch.new_id);

        debug!(
            stream = %self.stream,
            appended = outcome.appended,
            dropped = outcome.dropped,
            max_seen = self.cursors.max_seen(),
            "applied tail batch"
        );
        outcome
    }

    /// Prepend older entries in the order received
    pub fn apply_backfill(&mut self, batch: Batch) -> usize {
        self.backfill_pending = false;
        let floor = self.cursors.min_seen();
        let mut prepended = 0;

        for entry in &batch.entries {
            if floor != 0 && entry.id >= floor {
                trace!(stream = %self.stream, id = entry.id, floor, "skipping entry above low-water mark");
                continue;
            }
            self.view.prepend(RenderedNode::render(self.stream, entry));
            self.cursors.retreat_min(entry.id);
            prepended += 1;
        }
        if prepended > 0 {
            self.cursors.retreat_min(batch.new_id);
        }

        debug!(
            stream = %self.stream,
            prepended,
            min_seen = self.cursors.min_seen(),
            "applied backfill batch"
        );
        prepended
    }

    /// Apply any server event
    pub fn handle(&mut self, event: ServerEvent) -> PanelUpdate {
        if let Some(stream) = event.stream() {
            if stream != self.stream {
                return PanelUpdate::Ignored;
            }
        }

        match event {
            ServerEvent::Tail { batch, .. } => PanelUpdate::Tail(self.apply_tail(batch)),
            ServerEvent::Backfill { batch, .. } => PanelUpdate::Backfill {
                prepended: self.apply_backfill(batch),
            },
            ServerEvent::NoNewData { .. } => {
                self.backfill_pending = false;
                PanelUpdate::Idle
            }
            ServerEvent::Error { message } => {
                warn!(stream = %self.stream, %message, "server reported an error");
                self.backfill_pending = false;
                PanelUpdate::Failed { message }
            }
        }
    }

    /// Id of the last rendered node
    pub fn last_rendered_id(&self) -> Option<EntryId> {
        self.view.last_rendered_id()
    }

    pub fn into_view(self) -> V {
        self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::RenderedLog;

    fn entries(ids: &[EntryId]) -> Vec<LogEntry> {
        ids.iter()
            .map(|id| LogEntry::new(*id, "12:00", format!("line {id}")))
            .collect()
    }

    fn batch(ids: &[EntryId]) -> Batch {
        let new_id = ids.iter().copied().max().unwrap_or(0);
        Batch::new(entries(ids), new_id)
    }

    fn backfill_batch(ids: &[EntryId]) -> Batch {
        let new_id = ids.iter().copied().min().unwrap_or(0);
        Batch::new(entries(ids), new_id)
    }

    fn panel(page: &[EntryId]) -> LogPanel<RenderedLog> {
        LogPanel::with_initial_page(LogStream::Common, RenderedLog::new(), &entries(page))
    }

    #[test]
    fn test_initial_page_seeds_cursors() {
        let panel = panel(&[20, 21, 22]);
        assert_eq!(panel.cursors().max_seen(), 22);
        assert_eq!(panel.cursors().min_seen(), 20);
        assert_eq!(panel.view().ids(), vec![20, 21, 22]);
        assert_eq!(
            panel.tail_request(),
            ClientRequest::Tail { stream: LogStream::Common, after: 22 }
        );
    }

    #[test]
    fn test_tail_appends_newer_entries() {
        let mut panel = panel(&[1, 2]);
        let outcome = panel.apply_tail(batch(&[3, 4]));
        assert_eq!(outcome, TailOutcome { appended: 2, dropped: 0 });
        assert_eq!(panel.view().ids(), vec![1, 2, 3, 4]);
        assert_eq!(panel.cursors().max_seen(), 4);
    }

    #[test]
    fn test_tail_redelivery_is_idempotent() {
        let mut panel = panel(&[1, 2]);
        panel.apply_tail(batch(&[3, 4]));
        let outcome = panel.apply_tail(batch(&[3, 4]));
        assert_eq!(outcome, TailOutcome { appended: 0, dropped: 2 });

        let outcome = panel.apply_tail(batch(&[4, 5]));
        assert_eq!(outcome, TailOutcome { appended: 1, dropped: 1 });
        assert_eq!(panel.view().ids(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_tail_into_empty_panel_accepts_all() {
        let mut panel = LogPanel::new(LogStream::Chat, RenderedLog::new());
        let outcome = panel.apply_tail(batch(&[7, 8]));
        assert_eq!(outcome.appended, 2);
        assert_eq!(panel.cursors().min_seen(), 7);
        assert_eq!(panel.cursors().max_seen(), 8);
    }

    #[test]
    fn test_stale_new_id_does_not_lower_max() {
        let mut panel = panel(&[10]);
        panel.apply_tail(Batch::new(Vec::new(), 3));
        assert_eq!(panel.cursors().max_seen(), 10);
    }

    #[test]
    fn test_backfill_prepends_in_received_order() {
        let mut panel = panel(&[10, 11]);
        let request = panel.on_scroll(0.0).unwrap();
        assert_eq!(
            request,
            ClientRequest::Backfill { stream: LogStream::Common, before: 10 }
        );
        assert!(panel.backfill_pending());

        let prepended = panel.apply_backfill(backfill_batch(&[9, 8, 7]));
        assert_eq!(prepended, 3);
        assert_eq!(panel.view().ids(), vec![7, 8, 9, 10, 11]);
        assert_eq!(panel.cursors().min_seen(), 7);
        assert!(!panel.backfill_pending());
    }

    #[test]
    fn test_backfill_skips_entries_above_low_water_mark() {
        let mut panel = panel(&[10, 11]);
        panel.backfill_request();
        let prepended = panel.apply_backfill(backfill_batch(&[10, 9]));
        assert_eq!(prepended, 1);
        assert_eq!(panel.view().ids(), vec![9, 10, 11]);
    }

    #[test]
    fn test_scroll_away_from_top_does_nothing() {
        let mut panel = panel(&[10]);
        assert!(panel.on_scroll(120.0).is_none());
        assert!(!panel.backfill_pending());
    }

    #[test]
    fn test_backfill_in_flight_suppresses_second_request() {
        let mut panel = panel(&[10]);
        assert!(panel.backfill_request().is_some());
        assert!(panel.backfill_request().is_none());

        assert_eq!(
            panel.handle(ServerEvent::NoNewData { message: "No new data".into() }),
            PanelUpdate::Idle
        );
        assert!(panel.backfill_request().is_some());
    }

    #[test]
    fn test_nothing_to_backfill_from_first_entry() {
        let mut panel = panel(&[1, 2]);
        assert!(panel.backfill_request().is_none());

        let mut empty = LogPanel::new(LogStream::Chat, RenderedLog::new());
        assert!(empty.on_scroll(0.0).is_none());
    }

    #[test]
    fn test_events_for_other_stream_are_ignored() {
        let mut panel = panel(&[1]);
        let update = panel.handle(ServerEvent::Tail {
            stream: LogStream::Chat,
            batch: batch(&[2]),
        });
        assert_eq!(update, PanelUpdate::Ignored);
        assert_eq!(panel.view().len(), 1);
    }

    #[test]
    fn test_error_event_surfaces_message() {
        let mut panel = panel(&[5]);
        panel.backfill_request();
        let update = panel.handle(ServerEvent::Error { message: "Internal server error".into() });
        assert_eq!(update, PanelUpdate::Failed { message: "Internal server error".into() });
        assert!(!update.changed());
        assert!(!panel.backfill_pending());
    }
}
