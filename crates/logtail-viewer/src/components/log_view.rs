//! Live log panel: newest entries at the bottom, older ones fetched on
//! scroll-to-top.

use std::sync::Arc;

use dioxus::prelude::*;
use logtail_core::RenderedNode;

use crate::bridge::ViewerHandle;

use super::entry_row::EntryRow;

const SCROLL_ID: &str = "log-scroll";

/// Reads the scroll offset and remembers the distance from the bottom so a
/// prepend can keep the visible rows in place.
const SCROLL_METRICS_JS: &str = r#"
var el = document.getElementById('log-scroll');
if (!el) { return { top: 1, pinned: true }; }
el.dataset.anchor = el.scrollHeight - el.scrollTop;
return { top: el.scrollTop, pinned: el.scrollHeight - el.scrollTop - el.clientHeight < 40 };
"#;

const SCROLL_TO_BOTTOM_JS: &str =
    "var el = document.getElementById('log-scroll'); if(el) el.scrollTop = el.scrollHeight;";

const RESTORE_ANCHOR_JS: &str = "var el = document.getElementById('log-scroll'); \
    if(el && el.dataset.anchor) el.scrollTop = el.scrollHeight - Number(el.dataset.anchor);";

#[component]
pub fn LogView(handle: Arc<ViewerHandle>) -> Element {
    let initial = handle.session.snapshot();
    let mut nodes = use_signal(|| initial.nodes.clone());
    let mut generation = use_signal(|| initial.backfill_generation);
    let mut seen_generation = use_signal(|| initial.backfill_generation);
    let mut loading_older = use_signal(|| initial.backfill_pending);
    let mut pinned = use_signal(|| true);
    let asset_base = handle.asset_base();

    // Follow session snapshots
    let session = handle.session.clone();
    use_effect(move || {
        let mut snapshots = session.subscribe();
        spawn(async move {
            while snapshots.changed().await.is_ok() {
                let snapshot = snapshots.borrow_and_update().clone();
                loading_older.set(snapshot.backfill_pending);
                generation.set(snapshot.backfill_generation);
                nodes.set(snapshot.nodes);
            }
            tracing::debug!("snapshot stream closed");
        });
    });

    // Keep the view anchored after every render
    use_effect(move || {
        let current = *generation.read();
        let _count = nodes.read().len();
        if current != *seen_generation.peek() {
            seen_generation.set(current);
            document::eval(RESTORE_ANCHOR_JS);
        } else if *pinned.peek() {
            document::eval(SCROLL_TO_BOTTOM_JS);
        }
    });

    let session = handle.session.clone();
    let rows: Vec<RenderedNode> = nodes.read().clone();

    rsx! {
        div {
            class: "log-scroll",
            id: SCROLL_ID,
            onscroll: move |_| {
                let session = session.clone();
                spawn(async move {
                    let Ok(metrics) = document::eval(SCROLL_METRICS_JS).await else {
                        return;
                    };
                    pinned.set(metrics["pinned"].as_bool().unwrap_or(true));
                    if let Some(top) = metrics["top"].as_f64() {
                        session.report_scroll(top).await;
                    }
                });
            },
            if *loading_older.read() {
                div { class: "log-loading", "Loading older entries..." }
            }
            if rows.is_empty() {
                div { class: "log-empty", "Waiting for entries" }
            }
            for node in rows {
                EntryRow {
                    key: "{node.id()}",
                    node: node.clone(),
                    asset_base: asset_base.clone(),
                }
            }
        }
    }
}
