//! Entry point for the logtail desktop viewer.

use std::path::PathBuf;

use clap::Parser;
use dioxus::desktop::{Config, LogicalPosition, LogicalSize, WindowBuilder};
use logtail_client::LogtailConfig;
use logtail_core::LogStream;
use logtail_logging::{LogConfig, LogtailSubscriberBuilder};
use logtail_viewer::{VIEWER_CSS, bridge, components};

#[derive(Parser, Debug)]
#[command(name = "logtail-viewer", about = "Live log and chat viewer")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stream to open: chat or common
    #[arg(short, long)]
    stream: Option<LogStream>,

    /// JSONL feed replayed through the in-process server
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Also write JSONL log files to this directory (overrides LOGTAIL_LOG_DIR)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Pretty debug logging on the console
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut log_config = LogConfig::viewer(args.verbose).with_env_overrides(|key| std::env::var(key).ok());
    if let Some(dir) = &args.log_dir {
        log_config = log_config.with_log_dir(dir);
    }
    let _guard = LogtailSubscriberBuilder::new().with_config(log_config).init();

    let mut config = LogtailConfig::load(args.config.as_deref())?;
    if let Some(stream) = args.stream {
        config.tail.stream = stream;
    }
    if let Some(replay) = args.replay {
        config.tail.replay_path = Some(replay);
    }

    let window_title = format!("Logtail - {}", config.tail.stream);
    tracing::info!(server = %config.server.base_url, "Starting {}", window_title);
    bridge::install_config(config);

    // Optional window geometry from env for tiling
    let win_x = env_f64("LOGTAIL_WIN_X");
    let win_y = env_f64("LOGTAIL_WIN_Y");
    let win_w = env_f64("LOGTAIL_WIN_W");
    let win_h = env_f64("LOGTAIL_WIN_H");

    let mut wb = WindowBuilder::new()
        .with_title(&window_title)
        .with_maximized(false);

    if let (Some(w), Some(h)) = (win_w, win_h) {
        wb = wb.with_inner_size(LogicalSize::new(w, h));
    } else {
        wb = wb.with_inner_size(LogicalSize::new(900.0, 640.0));
    }

    if let (Some(x), Some(y)) = (win_x, win_y) {
        wb = wb.with_position(LogicalPosition::new(x, y));
    }

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            Config::new()
                .with_window(wb)
                .with_custom_head(format!(r#"<style>{}</style>"#, VIEWER_CSS)),
        )
        .launch(components::app::App);

    Ok(())
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key).ok().and_then(|v| v.parse::<f64>().ok())
}
