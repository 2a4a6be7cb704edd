//! Message compose bar with send button.

use dioxus::prelude::*;

/// Message input component. The draft is owned by the parent, which clears
/// it once the server replies.
#[component]
pub fn MessageInput(draft: Signal<String>, on_send: EventHandler<String>, sending: bool) -> Element {
    let mut draft = draft;

    rsx! {
        div { class: "message-input-bar",
            input {
                class: "message-input",
                r#type: "text",
                placeholder: "Write a message...",
                value: "{draft}",
                disabled: sending,
                oninput: move |evt| draft.set(evt.value()),
                onkeydown: move |evt: KeyboardEvent| {
                    if evt.key() == Key::Enter && !sending {
                        evt.prevent_default();
                        on_send.call(draft.read().clone());
                    }
                },
            }
            button {
                class: "send-button",
                disabled: sending,
                onclick: move |_| on_send.call(draft.read().clone()),
                "Send"
            }
        }
    }
}
