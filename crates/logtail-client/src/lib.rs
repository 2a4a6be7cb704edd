//! HTTP side of the logtail viewer: login, logout, message sending and
//! configuration.

pub mod api;
pub mod compose;
pub mod config;
pub mod error;
pub mod login;

pub use api::{ApiClient, ApiReply};
pub use compose::Composer;
pub use config::{LogtailConfig, ServerConfig, TailConfig, UiConfig};
pub use error::{ClientError, ClientResult, ConfigError, ConfigResult};
pub use login::{LoginFlow, REDIRECT_DELAY};
