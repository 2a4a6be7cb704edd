//! One rendered log line.

use dioxus::prelude::*;
use logtail_core::RenderedNode;

/// Chat bubble or plain server log line.
#[component]
pub fn EntryRow(node: RenderedNode, asset_base: String) -> Element {
    match node {
        RenderedNode::Chat {
            avatar_src,
            author,
            body,
            time,
            ..
        } => rsx! {
            div { class: "log-entry chat-entry",
                img {
                    class: "chat-avatar",
                    src: "{asset_base}{avatar_src}",
                    alt: "{author}",
                }
                div { class: "chat-body",
                    div { class: "chat-author", "{author}" }
                    div { class: "chat-bubble", "{body}" }
                }
                span { class: "chat-time", "{time}" }
            }
        },
        RenderedNode::Common { line, .. } => rsx! {
            div { class: "log-entry common-entry", "{line}" }
        },
    }
}
