//! Logtail viewer: desktop front end for a live log and chat server.
//!
//! Re-exports components, state, and bridge for embedding in other apps.

pub mod bridge;
pub mod components;
pub mod state;

/// Viewer CSS for embedding in host apps.
pub const VIEWER_CSS: &str = include_str!("style.css");
