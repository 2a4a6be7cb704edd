//! Global app state using Dioxus signals.

use std::sync::Arc;
use std::time::Duration;

use dioxus::prelude::*;
use logtail_core::{Notice, NoticeLevel};

use crate::bridge::ViewerHandle;

/// Top-level app phase.
#[derive(Clone, Debug, PartialEq)]
pub enum AppPhase {
    /// Starting the tail session
    Connecting,
    /// Session could not start
    Failed(String),
    /// Log view
    Running(Arc<ViewerHandle>),
}

/// A notice on screen, keyed for removal.
#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub level: NoticeLevel,
    pub text: String,
    pub duration: Duration,
}

/// Shared viewer state provided via Dioxus context.
#[derive(Clone, Copy)]
pub struct ViewerContext {
    pub handle: Signal<Arc<ViewerHandle>>,
    pub logged_in: Signal<bool>,
    pub show_login: Signal<bool>,
    pub toasts: Signal<Vec<Toast>>,
    pub next_toast_id: Signal<u64>,
}

impl ViewerContext {
    /// Show a notice and schedule its removal
    pub fn notify(&mut self, notice: Notice) {
        let id = *self.next_toast_id.read();
        self.next_toast_id.set(id + 1);
        let duration = notice.duration;
        self.toasts.write().push(Toast {
            id,
            level: notice.level,
            text: notice.text,
            duration,
        });

        let mut toasts = self.toasts;
        spawn(async move {
            tokio::time::sleep(duration).await;
            toasts.write().retain(|t| t.id != id);
        });
    }
}
