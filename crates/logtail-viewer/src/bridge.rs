//! Viewer bridge: wires the tail session and HTTP client for the UI.

use std::sync::{Arc, OnceLock};

use logtail_client::{ApiClient, Composer, LoginFlow, LogtailConfig};
use logtail_core::{
    LocalChannel, LogPanel, LogStream, MemoryFeed, RenderedLog, SessionHandle, TailSession,
};

static CONFIG: OnceLock<LogtailConfig> = OnceLock::new();

/// Install the configuration loaded by `main`. Later calls are ignored.
pub fn install_config(config: LogtailConfig) {
    if CONFIG.set(config).is_err() {
        tracing::warn!("viewer configuration already installed");
    }
}

/// The installed configuration, or defaults
pub fn config() -> LogtailConfig {
    CONFIG.get().cloned().unwrap_or_default()
}

/// Everything the UI needs to talk to the server
#[derive(Clone)]
pub struct ViewerHandle {
    pub stream: LogStream,
    pub session: SessionHandle,
    pub login: LoginFlow,
    pub composer: Composer,
    pub feed: Arc<MemoryFeed>,
}

impl std::fmt::Debug for ViewerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerHandle")
            .field("stream", &self.stream)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ViewerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.stream == other.stream && Arc::ptr_eq(&self.feed, &other.feed)
    }
}

impl ViewerHandle {
    /// Base URL used to resolve avatar paths
    pub fn asset_base(&self) -> String {
        self.login.api().base_url().as_str().trim_end_matches('/').to_string()
    }

    /// Stop the tail session
    pub async fn close(&self) {
        self.session.shutdown().await;
    }
}

/// Load the feed the session tails: the replay file when configured, an
/// empty feed otherwise.
pub fn open_feed(config: &LogtailConfig) -> Result<Arc<MemoryFeed>, String> {
    let feed = match &config.tail.replay_path {
        Some(path) => MemoryFeed::load_jsonl(path).map_err(|e| format!("{}", e))?,
        None => MemoryFeed::new(),
    };
    Ok(Arc::new(feed))
}

/// Start a tail session for `stream` over `feed`.
pub fn connect(
    config: &LogtailConfig,
    feed: Arc<MemoryFeed>,
    stream: LogStream,
) -> Result<ViewerHandle, String> {
    let api = ApiClient::new(&config.server.base_url).map_err(|e| format!("{}", e))?;

    let (client, server) = LocalChannel::pair();
    tokio::spawn(Arc::clone(&feed).serve(server));

    let page = feed.initial_page(stream).map_err(|e| format!("{}", e))?;
    let panel = LogPanel::with_initial_page(stream, RenderedLog::new(), &page);
    let (session, _task) = TailSession::new(client, panel)
        .with_poll_interval(config.poll_interval())
        .spawn();

    tracing::info!(%stream, initial = page.len(), server = %config.server.base_url, "viewer connected");

    Ok(ViewerHandle {
        stream,
        session,
        login: LoginFlow::new(api.clone()),
        composer: Composer::new(api),
        feed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtail_core::LogEntry;

    #[tokio::test]
    async fn test_connect_shows_initial_page() {
        let feed = Arc::new(MemoryFeed::new());
        for id in 1..=3 {
            feed.insert(LogStream::Common, LogEntry::new(id, "10:00", "boot")).unwrap();
        }

        let handle = connect(&LogtailConfig::default(), feed, LogStream::Common).unwrap();
        let snapshot = handle.session.snapshot();
        assert_eq!(snapshot.stream, LogStream::Common);
        assert_eq!(snapshot.nodes.len(), 3);
        assert_eq!(handle.asset_base(), "http://127.0.0.1:211");
        handle.close().await;
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        let mut config = LogtailConfig::default();
        config.server.base_url = "nowhere".to_string();
        let feed = open_feed(&config).unwrap();
        assert!(connect(&config, feed, LogStream::Chat).is_err());
    }

    #[test]
    fn test_open_feed_reports_missing_file() {
        let mut config = LogtailConfig::default();
        config.tail.replay_path = Some("/nonexistent/feed.jsonl".into());
        assert!(open_feed(&config).is_err());
    }
}
