//! dockman binary entrypoint kept minimal. The full runtime lives in `app`.

mod app;
mod config;
mod controller;
mod events;
mod lifecycle;
mod net;
mod state;
mod theme;
mod ui;
mod util;

use std::fmt;
use std::sync::OnceLock;

use clap::Parser;

struct DockmanTimer;

impl tracing_subscriber::fmt::time::FormatTime for DockmanTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        w.write_str(&crate::util::now_datetime())
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

fn init_logging() {
    let mut log_path = crate::theme::logs_dir();
    log_path.push("dockman.log");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_timer(DockmanTimer)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        Err(e) => {
            // Fallback: stderr logger so startup is never blocked on disk.
            let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(true)
                .with_timer(DockmanTimer)
                .init();
            tracing::warn!(error = %e, "failed to open log file; using stderr");
        }
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    let cli = config::Cli::parse();
    let settings = config::load(&cli);
    tracing::info!(
        server = %settings.server_url,
        interval_ms = settings.refresh_interval_ms,
        "dockman starting"
    );
    if let Err(err) = app::run(settings).await {
        tracing::error!(error = ?err, "Application error");
    }
    tracing::info!("dockman exited");
}
