//! Transient notices stacked in the corner.

use dioxus::prelude::*;
use logtail_core::NoticeLevel;

use crate::state::ViewerContext;

#[component]
pub fn ToastStack() -> Element {
    let ctx = use_context::<ViewerContext>();
    let toasts = ctx.toasts.read().clone();

    rsx! {
        div { class: "toast-stack",
            for toast in toasts {
                div {
                    key: "{toast.id}",
                    class: match toast.level {
                        NoticeLevel::Success => "toast toast-success",
                        NoticeLevel::Error => "toast toast-error",
                    },
                    "{toast.text}"
                }
            }
        }
    }
}
