//! UI components for the viewer.

pub mod app;
pub mod entry_row;
pub mod log_view;
pub mod login;
pub mod message_input;
pub mod toast;
