//! Root app component: starts the tail session and lays out the viewer.

use std::sync::Arc;
use std::time::Duration;

use dioxus::prelude::*;
use logtail_client::ClientError;
use logtail_core::Notice;

use crate::bridge::{self, ViewerHandle};
use crate::state::{AppPhase, ViewerContext};

/// Root application component.
#[component]
pub fn App() -> Element {
    let mut phase = use_signal(|| AppPhase::Connecting);

    // Connect on mount
    use_effect(move || {
        if *phase.peek() == AppPhase::Connecting {
            spawn(async move {
                let config = bridge::config();
                let connected = bridge::open_feed(&config)
                    .and_then(|feed| bridge::connect(&config, feed, config.tail.stream));
                match connected {
                    Ok(handle) => phase.set(AppPhase::Running(Arc::new(handle))),
                    Err(e) => {
                        tracing::error!(error = %e, "failed to start viewer");
                        phase.set(AppPhase::Failed(e));
                    }
                }
            });
        }
    });

    let current_phase = phase.read().clone();

    match current_phase {
        AppPhase::Connecting => rsx! {
            div { class: "loading-screen",
                div { class: "loading-text", "Connecting..." }
            }
        },
        AppPhase::Failed(message) => rsx! {
            div { class: "loading-screen",
                div { class: "loading-error", "{message}" }
            }
        },
        AppPhase::Running(handle) => rsx! {
            MainLayout { handle }
        },
    }
}

/// Log view, composer and login overlay with shared context.
#[component]
fn MainLayout(handle: Arc<ViewerHandle>) -> Element {
    let mut ctx = use_context_provider(|| ViewerContext {
        handle: Signal::new(handle.clone()),
        logged_in: Signal::new(false),
        show_login: Signal::new(false),
        toasts: Signal::new(Vec::new()),
        next_toast_id: Signal::new(0),
    });
    let mut draft = use_signal(String::new);
    let mut sending = use_signal(|| false);

    // Forward session notices to the toast stack
    use_effect(move || {
        let mut notices = ctx.handle.read().session.notices();
        spawn(async move {
            while let Ok(notice) = notices.recv().await {
                ctx.notify(notice);
            }
        });
    });

    let send_notice = Duration::from_millis(bridge::config().ui.send_notice_ms);
    let on_send = move |text: String| {
        let composer = ctx.handle.read().composer.clone();
        spawn(async move {
            sending.set(true);
            let result = composer.send(&text).await;
            if let Err(e) = &result {
                tracing::warn!(error = %e, "message not sent");
            }
            if !matches!(result, Err(ClientError::EmptyMessage | ClientError::SendInFlight)) {
                draft.set(String::new());
            }
            ctx.notify(Notice::from_result(&result).with_duration(send_notice));
            sending.set(false);
        });
    };

    let switch_stream = move |_: MouseEvent| {
        let current = ctx.handle.read().clone();
        let next = current.stream.other();
        spawn(async move {
            current.close().await;
            match bridge::connect(&bridge::config(), Arc::clone(&current.feed), next) {
                Ok(handle) => ctx.handle.set(Arc::new(handle)),
                Err(e) => ctx.notify(Notice::error(e)),
            }
        });
    };

    let logout = move |_: MouseEvent| {
        let login = ctx.handle.read().login.clone();
        spawn(async move {
            match login.logout().await {
                Ok(()) => {
                    ctx.logged_in.set(false);
                    ctx.notify(Notice::success("Logged out"));
                }
                Err(e) => ctx.notify(Notice::error(e.to_string())),
            }
        });
    };

    let current = ctx.handle.read().clone();
    let stream = current.stream;
    let other = stream.other();
    let logged_in = *ctx.logged_in.read();

    rsx! {
        div { class: "main-layout",
            div { class: "viewer-header",
                div { class: "viewer-title", "{stream}" }
                button {
                    class: "header-button",
                    onclick: switch_stream,
                    "Show {other}"
                }
                if logged_in {
                    button { class: "header-button", onclick: logout, "Log out" }
                } else {
                    button {
                        class: "header-button",
                        onclick: move |_| ctx.show_login.set(true),
                        "Log in"
                    }
                }
            }

            super::log_view::LogView { key: "{stream}", handle: current }

            super::message_input::MessageInput {
                draft,
                on_send,
                sending: *sending.read(),
            }

            if *ctx.show_login.read() {
                super::login::LoginPanel {
                    on_close: move |_| ctx.show_login.set(false),
                }
            }

            super::toast::ToastStack {}
        }
    }
}
