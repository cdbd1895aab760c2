use std::path::PathBuf;

use serde::Deserialize;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/jukebox/config.toml` or `~/.config/jukebox/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `JUKEBOX__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerSettings,
    pub library: LibrarySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Volume applied at startup (percent).
    pub default_volume: u8,
    /// Skip hardware mixer detection and always use the engine's own volume.
    pub force_software_volume: bool,
    /// Increment used by volume up/down.
    pub volume_step: u8,
    /// Step size the hardware mixer snaps to.
    pub hardware_volume_granularity: u8,
    /// How many times to check engine readiness before giving up on a switch.
    pub ready_poll_attempts: u32,
    /// Sleep between readiness checks (milliseconds).
    pub ready_poll_interval_ms: u64,
    /// How often the hardware mixer is polled for outside changes (milliseconds).
    pub mixer_poll_interval_ms: u64,
    /// Playback mode at startup.
    pub default_mode: ModeSetting,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            default_volume: 30,
            force_software_volume: false,
            volume_step: 5,
            hardware_volume_granularity: 5,
            ready_poll_attempts: 1000,
            ready_poll_interval_ms: 10,
            mixer_poll_interval_ms: 1000,
            default_mode: ModeSetting::Sequential,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeSetting {
    #[serde(alias = "normal", alias = "default")]
    Sequential,
    #[serde(alias = "repeat", alias = "repeat-one", alias = "loop-one")]
    Loop,
    #[serde(alias = "random")]
    Shuffle,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
    /// Where saved playlists live. Falls back to the XDG data directory.
    pub playlist_dir: Option<PathBuf>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
            playlist_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing-subscriber` filter directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}
