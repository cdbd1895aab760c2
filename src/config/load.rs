use std::{env, path::PathBuf};

use super::schema::{LibrarySettings, Settings};

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `JUKEBOX__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("JUKEBOX")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.player.ready_poll_attempts == 0 {
            return Err("player.ready_poll_attempts must be >= 1".to_string());
        }
        if self.player.volume_step == 0 {
            return Err("player.volume_step must be >= 1".to_string());
        }
        if self.player.hardware_volume_granularity == 0 {
            return Err("player.hardware_volume_granularity must be >= 1".to_string());
        }
        if self.player.default_volume > 100 {
            return Err("player.default_volume must be <= 100".to_string());
        }
        Ok(())
    }
}

impl LibrarySettings {
    /// The configured playlist directory, or the XDG data default.
    pub fn resolved_playlist_dir(&self) -> Option<PathBuf> {
        self.playlist_dir.clone().or_else(default_playlist_dir)
    }
}

/// Resolve the config path from `JUKEBOX_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("JUKEBOX_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/jukebox/config.toml`
/// or `~/.config/jukebox/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("jukebox").join("config.toml"))
}

/// `$XDG_DATA_HOME/jukebox/playlists` or `~/.local/share/jukebox/playlists`.
pub fn default_playlist_dir() -> Option<PathBuf> {
    let data_home = if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
    };

    data_home.map(|d| d.join("jukebox").join("playlists"))
}
