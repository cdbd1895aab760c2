use super::load::{default_config_path, default_playlist_dir, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_jukebox_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("JUKEBOX_CONFIG_PATH", "/tmp/jukebox-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/jukebox-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("jukebox")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("jukebox")
            .join("config.toml")
    );
}

#[test]
fn playlist_dir_defaults_to_xdg_data_home_unless_configured() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_DATA_HOME", "/tmp/xdg-data");

    assert_eq!(
        default_playlist_dir().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-data/jukebox/playlists")
    );

    let library = LibrarySettings {
        playlist_dir: Some("/srv/lists".into()),
        ..LibrarySettings::default()
    };
    assert_eq!(
        library.resolved_playlist_dir().unwrap(),
        std::path::PathBuf::from("/srv/lists")
    );
}

#[test]
fn settings_load_from_config_file_and_parse_mode_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[player]
default_volume = 55
force_software_volume = true
volume_step = 10
ready_poll_attempts = 20
ready_poll_interval_ms = 2
default_mode = "random"

[library]
extensions = ["mp3"]
recursive = false
include_hidden = true
follow_links = false
playlist_dir = "/tmp/lists"

[logging]
filter = "jukebox=debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("JUKEBOX_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("JUKEBOX__PLAYER__DEFAULT_VOLUME");

    let s = Settings::load().unwrap();
    assert_eq!(s.player.default_volume, 55);
    assert!(s.player.force_software_volume);
    assert_eq!(s.player.volume_step, 10);
    assert_eq!(s.player.ready_poll_attempts, 20);
    assert_eq!(s.player.ready_poll_interval_ms, 2);
    assert_eq!(s.player.default_mode, ModeSetting::Shuffle);
    assert_eq!(s.player.hardware_volume_granularity, 5);
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(
        s.library.playlist_dir,
        Some(std::path::PathBuf::from("/tmp/lists"))
    );
    assert_eq!(s.logging.filter, "jukebox=debug");
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[player]
default_volume = 80
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("JUKEBOX_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("JUKEBOX__PLAYER__DEFAULT_VOLUME", "15");

    let s = Settings::load().unwrap();
    assert_eq!(s.player.default_volume, 15);
}

#[test]
fn mode_setting_accepts_legacy_names() {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        mode: ModeSetting,
    }

    let parse = |raw: &str| toml::from_str::<Wrapper>(&format!("mode = \"{raw}\"")).unwrap().mode;
    assert_eq!(parse("normal"), ModeSetting::Sequential);
    assert_eq!(parse("sequential"), ModeSetting::Sequential);
    assert_eq!(parse("repeat"), ModeSetting::Loop);
    assert_eq!(parse("loop"), ModeSetting::Loop);
    assert_eq!(parse("shuffle"), ModeSetting::Shuffle);
}

#[test]
fn validate_rejects_zero_poll_attempts_and_loud_defaults() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.player.ready_poll_attempts = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.player.default_volume = 101;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.player.hardware_volume_granularity = 0;
    assert!(s.validate().is_err());
}
