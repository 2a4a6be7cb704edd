//! Live-tail and backfill core for the logtail viewer
//!
//! A log server publishes two streams of entries over a push channel. The
//! viewer keeps the newest entries flowing in at the bottom of a panel and
//! fetches older ones when the user scrolls to the top.
//!
//! - [`LogPanel`] is the view-controller: it owns the rendered container and
//!   the [`Cursors`] for one stream and turns [`ServerEvent`]s into appends
//!   and prepends.
//! - [`PushChannel`] is the transport seam; [`LocalChannel`] and
//!   [`MemoryFeed`] provide an in-process server for tests and offline use.
//! - [`TailSession`] runs the poll timer and owns the panel on a tokio task.
//! - [`login`] holds the login form rules shared by every front end.

pub mod channel;
pub mod cursor;
pub mod entry;
pub mod error;
pub mod feed;
pub mod login;
pub mod notice;
pub mod panel;
pub mod protocol;
pub mod session;
pub mod view;

pub use channel::{LocalChannel, LocalServerEnd, PushChannel};
pub use cursor::Cursors;
pub use entry::{EntryId, LogEntry, LogStream};
pub use error::{ChannelError, ChannelResult, CoreError, CoreResult};
pub use feed::{FEED_PAGE_LIMIT, INITIAL_PAGE_SIZE, MemoryFeed};
pub use login::{CodeRequestGate, CodeRequestPermit, LoginForm, LoginValidation};
pub use notice::{Notice, NoticeLevel};
pub use panel::{LogPanel, PanelUpdate, TailOutcome};
pub use protocol::{Batch, ClientRequest, Frame, ServerEvent};
pub use session::{DEFAULT_POLL_INTERVAL, SessionCommand, SessionHandle, SessionSnapshot, TailSession};
pub use view::{LogView, RenderedLog, RenderedNode};
