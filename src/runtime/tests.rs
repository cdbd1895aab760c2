use std::io::Cursor;
use std::sync::{Arc, mpsc};

use serde_json::Value;

use super::event_loop::serve;
use super::startup::apply_playback_defaults;
use crate::config::{ModeSetting, Settings};
use crate::controller::{Controller, ControllerParts};
use crate::engine::PlaybackEngine;
use crate::engine::testing::FakeEngine;
use crate::mode::{ModeEngine, PlaybackMode};
use crate::notify::ChannelSink;
use crate::volume::{SoftwareVolume, VolumeKind};

fn controller(engine: Arc<FakeEngine>) -> Controller {
    let (tx, _rx) = mpsc::channel();
    Controller::new(
        ControllerParts {
            engine: engine.clone(),
            volume: Box::new(SoftwareVolume::new(engine)),
            sink: Arc::new(ChannelSink::new(tx)),
            metadata: None,
            playlists: None,
            modes: ModeEngine::with_seed(3),
        },
        &Settings::default(),
    )
}

#[test]
fn serve_answers_every_non_empty_line() {
    let ctrl = controller(Arc::new(FakeEngine::new()));
    let input = Cursor::new(
        "{\"command\": \"player_volume_get\"}\n\n   \n{\"command\": \"nope\"}\n",
    );
    let mut output = Vec::new();
    serve(&ctrl, input, &mut output).unwrap();

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["command"], "player_volume_get");
    assert_eq!(lines[0]["response"]["volume"], 100);
    assert_eq!(lines[1]["command"], "invalid");
}

#[test]
fn defaults_apply_mode_and_software_volume() {
    let engine = Arc::new(FakeEngine::new());
    let ctrl = controller(engine.clone());
    let mut settings = Settings::default();
    settings.player.default_mode = ModeSetting::Loop;
    settings.player.default_volume = 25;

    apply_playback_defaults(&ctrl, VolumeKind::Software, &settings);
    assert_eq!(ctrl.mode(), PlaybackMode::Loop);
    assert!(engine.repeat());
    assert_eq!(engine.volume(), 25);
}

#[test]
fn hardware_backend_keeps_host_level() {
    let engine = Arc::new(FakeEngine::new());
    let ctrl = controller(engine.clone());
    apply_playback_defaults(&ctrl, VolumeKind::Hardware, &Settings::default());
    assert_eq!(engine.volume(), 100);
}
