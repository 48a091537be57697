//! Color palette and on-disk directory resolution for dockman.
//!
//! The palette is a trimmed Catppuccin-style set grouped into neutrals,
//! overlays, and semantic accents (success / warning / danger). The same
//! module owns the config and log directory lookup so every layer resolves
//! paths the same way.

use ratatui::style::Color;
use std::env;
use std::path::{Path, PathBuf};

/// Application theme palette used by rendering code.
pub struct Theme {
    /// Primary background color for the canvas.
    pub base: Color,
    /// Slightly lighter background layer used behind panels.
    pub mantle: Color,
    /// Muted line/border color.
    pub overlay1: Color,
    /// Primary foreground text color.
    pub text: Color,
    /// Secondary text for less prominent content.
    pub subtext0: Color,
    /// Accent color for interactive highlights and key hints.
    pub sapphire: Color,
    /// Success/positive state color.
    pub green: Color,
    /// Warning/attention state color.
    pub yellow: Color,
    /// Error/danger state color.
    pub red: Color,
    /// Accent for subtle emphasis and borders.
    pub lavender: Color,
}

/// Construct a [`Color::Rgb`] from an 8-bit RGB triplet.
fn hex(rgb: (u8, u8, u8)) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Return the application's default theme palette.
pub fn theme() -> Theme {
    Theme {
        base: hex((0x1e, 0x1e, 0x2e)),
        mantle: hex((0x18, 0x18, 0x25)),
        overlay1: hex((0x7f, 0x84, 0x9c)),
        text: hex((0xcd, 0xd6, 0xf4)),
        subtext0: hex((0xa6, 0xad, 0xc8)),
        sapphire: hex((0x74, 0xc7, 0xec)),
        green: hex((0xa6, 0xe3, 0xa1)),
        yellow: hex((0xf9, 0xe2, 0xaf)),
        red: hex((0xf3, 0x8b, 0xa8)),
        lavender: hex((0xb4, 0xbe, 0xfe)),
    }
}

/// Resolve dockman's configuration directory, creating it when missing.
///
/// Prefers `$XDG_CONFIG_HOME/dockman`, falling back to `~/.config/dockman`.
pub fn config_dir() -> PathBuf {
    let base = env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            env::var("HOME")
                .ok()
                .map(|h| Path::new(&h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from("."));
    let dir = base.join("dockman");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Resolve the log directory under the config dir, creating it when missing.
pub fn logs_dir() -> PathBuf {
    let dir = config_dir().join("logs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    /// What: palette accessor returns distinct semantic accent colors.
    ///
    /// - Input: none
    /// - Output: success, warning, and danger colors differ from each other
    #[test]
    fn theme_semantic_colors_are_distinct() {
        let t = theme();
        assert_ne!(t.green, t.red);
        assert_ne!(t.green, t.yellow);
        assert_ne!(t.yellow, t.red);
    }

    /// What: `logs_dir` nests under `config_dir`.
    ///
    /// - Input: current environment
    /// - Output: logs path starts with the config path
    #[test]
    fn logs_dir_is_under_config_dir() {
        assert!(logs_dir().starts_with(config_dir()));
    }
}
