//! Settings resolution: `dockman.conf` on disk, overridden by CLI flags.
//!
//! The config file uses plain `key = value` lines with `#` comments,
//! resolved from `~/.config/dockman/dockman.conf` or the XDG equivalent.
//! Recognized keys: `server_url`, `auto_refresh_interval_ms`,
//! `auto_refresh_default`.

use std::env;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::state::DEFAULT_REFRESH_INTERVAL_MS;

/// Floor for the poll interval so a typo cannot spin the poller.
const MIN_REFRESH_INTERVAL_MS: u64 = 250;

/// Command-line interface.
#[derive(Parser, Debug, Default)]
#[command(name = "dockman", version, about = "Terminal control panel for a host Docker Engine installation")]
pub struct Cli {
    /// Base URL of the control API server
    #[arg(long)]
    pub server: Option<String>,
    /// Auto-refresh interval in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,
    /// Start with auto-refresh enabled
    #[arg(long)]
    pub auto_refresh: bool,
}

/// Effective settings after merging defaults, config file, and CLI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Control API base URL.
    pub server_url: String,
    /// Auto-refresh poll interval in milliseconds.
    pub refresh_interval_ms: u64,
    /// Whether the auto-refresh preference starts enabled.
    pub auto_refresh_default: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            auto_refresh_default: false,
        }
    }
}

/// Load settings: defaults, then the config file, then CLI overrides.
pub fn load(cli: &Cli) -> Settings {
    let mut settings = Settings::default();
    if let Some(path) = resolve_config_path()
        && let Ok(text) = std::fs::read_to_string(&path)
    {
        tracing::info!(path = %path.display(), "loading settings");
        apply_conf(&mut settings, &text);
    }
    if let Some(server) = &cli.server {
        settings.server_url = server.clone();
    }
    if let Some(interval) = cli.interval_ms {
        settings.refresh_interval_ms = interval;
    }
    if cli.auto_refresh {
        settings.auto_refresh_default = true;
    }
    settings.refresh_interval_ms = settings.refresh_interval_ms.max(MIN_REFRESH_INTERVAL_MS);
    settings
}

/// Locate `dockman.conf`, preferring `$HOME/.config` then `$XDG_CONFIG_HOME`.
fn resolve_config_path() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(home) = env::var("HOME") {
        candidates.push(Path::new(&home).join(".config").join("dockman").join("dockman.conf"));
    }
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        candidates.push(Path::new(&xdg).join("dockman").join("dockman.conf"));
    }
    candidates.into_iter().find(|p| p.is_file())
}

/// Apply `key = value` lines onto `settings`. Unknown keys are ignored so
/// old configs keep working.
fn apply_conf(settings: &mut Settings, text: &str) {
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        match key {
            "server_url" => {
                if !value.is_empty() {
                    settings.server_url = value.to_string();
                }
            }
            "auto_refresh_interval_ms" => {
                if let Ok(ms) = value.parse::<u64>() {
                    settings.refresh_interval_ms = ms;
                }
            }
            "auto_refresh_default" => {
                settings.auto_refresh_default =
                    matches!(value.to_ascii_lowercase().as_str(), "true" | "on" | "1" | "yes");
            }
            _ => {}
        }
    }
}
