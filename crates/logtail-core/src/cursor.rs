//! High- and low-water marks of a log panel

use crate::entry::{EntryId, LogEntry};

/// The two ids a panel remembers between requests.
///
/// `max_seen` only moves up, `min_seen` only moves down. Zero means the
/// mark has not been seeded yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursors {
    max_seen: EntryId,
    min_seen: EntryId,
}

impl Cursors {
    pub fn new(max_seen: EntryId, min_seen: EntryId) -> Self {
        Self { max_seen, min_seen }
    }

    /// Seed from the initial page of entries, assumed ascending by id
    pub fn seeded_from(entries: &[LogEntry]) -> Self {
        let max_seen = entries.last().map_or(0, |e| e.id);
        let min_seen = entries.first().map_or(0, |e| e.id);
        Self { max_seen, min_seen }
    }

    pub fn max_seen(&self) -> EntryId {
        self.max_seen
    }

    pub fn min_seen(&self) -> EntryId {
        self.min_seen
    }

    /// Raise the high-water mark. Returns true if it moved.
    pub fn advance_max(&mut self, id: EntryId) -> bool {
        if id > self.max_seen {
            self.max_seen = id;
            true
        } else {
            false
        }
    }

    /// Lower the low-water mark. Returns true if it moved.
    pub fn retreat_min(&mut self, id: EntryId) -> bool {
        if id == 0 {
            return false;
        }
        if self.min_seen == 0 || id < self.min_seen {
            self.min_seen = id;
            true
        } else {
            false
        }
    }

    /// Whether anything older than the low-water mark can exist
    pub fn can_backfill(&self) -> bool {
        self.min_seen > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_from_page() {
        let page = vec![
            LogEntry::new(5, "00:00", "a"),
            LogEntry::new(6, "00:01", "b"),
            LogEntry::new(9, "00:02", "c"),
        ];
        let cursors = Cursors::seeded_from(&page);
        assert_eq!(cursors.max_seen(), 9);
        assert_eq!(cursors.min_seen(), 5);

        let empty = Cursors::seeded_from(&[]);
        assert_eq!(empty, Cursors::default());
        assert!(!empty.can_backfill());
    }

    #[test]
    fn test_max_never_decreases() {
        let mut cursors = Cursors::new(10, 3);
        assert!(cursors.advance_max(12));
        assert!(!cursors.advance_max(11));
        assert!(!cursors.advance_max(12));
        assert_eq!(cursors.max_seen(), 12);
    }

    #[test]
    fn test_min_never_increases() {
        let mut cursors = Cursors::new(10, 5);
        assert!(cursors.retreat_min(2));
        assert!(!cursors.retreat_min(4));
        assert!(!cursors.retreat_min(0));
        assert_eq!(cursors.min_seen(), 2);
    }

    #[test]
    fn test_unseeded_min_takes_first_value() {
        let mut cursors = Cursors::default();
        assert!(cursors.retreat_min(40));
        assert_eq!(cursors.min_seen(), 40);
        assert!(cursors.can_backfill());
    }
}
