use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use serde_json::{Value, json};

use super::*;
use crate::config::Settings;
use crate::controller::{Controller, ControllerParts};
use crate::engine::testing::FakeEngine;
use crate::error::Error;
use crate::mode::ModeEngine;
use crate::notify::{ChannelSink, Notification};
use crate::volume::SoftwareVolume;

fn controller() -> (Controller, Receiver<Notification>) {
    let engine = Arc::new(FakeEngine::new());
    let (tx, rx) = mpsc::channel();
    let mut settings = Settings::default();
    settings.player.ready_poll_attempts = 5;
    settings.player.ready_poll_interval_ms = 1;
    let ctrl = Controller::new(
        ControllerParts {
            engine: engine.clone(),
            volume: Box::new(SoftwareVolume::new(engine)),
            sink: Arc::new(ChannelSink::new(tx)),
            metadata: None,
            playlists: None,
            modes: ModeEngine::with_seed(2),
        },
        &settings,
    );
    (ctrl, rx)
}

fn parse(name: &str, data: Value) -> crate::error::Result<Option<Command>> {
    Command::parse(name, &data)
}

#[test]
fn parses_payloads_in_their_accepted_shapes() {
    assert_eq!(parse("player_play", Value::Null).unwrap(), Some(Command::Play));
    assert_eq!(
        parse("player_set_position", json!(0.5)).unwrap(),
        Some(Command::SetPosition(0.5))
    );
    assert_eq!(
        parse("player_volume_set", json!("42")).unwrap(),
        Some(Command::VolumeSet(42))
    );
    assert_eq!(
        parse("tracklist_add", json!("/music/a.mp3")).unwrap(),
        Some(Command::TracklistAdd(vec!["/music/a.mp3".into()]))
    );
    assert_eq!(
        parse("tracklist_play_new", json!(["/a.mp3", "/b.mp3"])).unwrap(),
        Some(Command::TracklistPlayNew(vec!["/a.mp3".into(), "/b.mp3".into()]))
    );
    assert_eq!(
        parse("tracklist_remove_index", json!(3)).unwrap(),
        Some(Command::TracklistRemove(BTreeSet::from([3])))
    );
    assert_eq!(
        parse("tracklist_remove_index", json!([4, 1, 4])).unwrap(),
        Some(Command::TracklistRemove(BTreeSet::from([1, 4])))
    );
    assert_eq!(
        parse("tracklist_add_random", json!(["/music", 10, 1])).unwrap(),
        Some(Command::TracklistAddRandom {
            root: PathBuf::from("/music"),
            count: 10,
            clear_first: true,
        })
    );
    assert_eq!(
        parse("tracklist_add_random", json!(["/music", "2", false])).unwrap(),
        Some(Command::TracklistAddRandom {
            root: PathBuf::from("/music"),
            count: 2,
            clear_first: false,
        })
    );
    assert_eq!(
        parse("tracklist_update", Value::Null).unwrap(),
        Some(Command::TracklistGet)
    );
    assert_eq!(
        parse("playlist_rename", json!(["old", "new"])).unwrap(),
        Some(Command::PlaylistRename {
            old: "old".into(),
            new: "new".into()
        })
    );
}

#[test]
fn malformed_payloads_are_validation_errors() {
    let bad = [
        ("player_set_position", json!("half")),
        ("player_volume_set", Value::Null),
        ("tracklist_add", json!(42)),
        ("tracklist_add", json!([])),
        ("tracklist_add", json!(["/a.mp3", 3])),
        ("tracklist_play_index", json!(-1)),
        ("tracklist_remove_index", json!([])),
        ("tracklist_add_random", json!(["/music", 10])),
        ("tracklist_add_random", json!(["/music", 0, true])),
        ("playlist_save", json!("  ")),
        ("playlist_rename", json!(["only-one"])),
    ];
    for (name, data) in bad {
        let err = parse(name, data.clone()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{name} {data}");
    }
}

#[test]
fn unknown_commands_get_an_invalid_response() {
    let (ctrl, _rx) = controller();
    let resp = handle_request(&ctrl, r#"{"command": "player_explode"}"#);
    assert_eq!(resp.command, "invalid");
    assert!(resp.response["error"].as_str().unwrap().contains("player_explode"));

    let resp = handle_request(&ctrl, "not json");
    assert_eq!(resp.command, "invalid");
}

#[test]
fn errors_become_response_payloads() {
    let (ctrl, _rx) = controller();
    let resp = handle_request(&ctrl, r#"{"command": "player_play"}"#);
    assert_eq!(resp.command, "player_play");
    assert_eq!(resp.response, json!({"error": "empty tracklist"}));

    let resp = handle_request(&ctrl, r#"{"command": "player_volume_set", "data": "loud"}"#);
    assert!(resp.response["error"].as_str().unwrap().starts_with("invalid request"));
}

#[test]
fn add_and_play_through_the_command_surface() {
    let (ctrl, rx) = controller();
    let resp = handle_request(
        &ctrl,
        r#"{"command": "tracklist_add", "data": ["http://radio.example/a", "http://radio.example/b"]}"#,
    );
    assert_eq!(resp.response["added"], 2);
    assert_eq!(resp.response["tracklist"].as_array().unwrap().len(), 2);
    let toasts: Vec<String> = rx
        .try_iter()
        .filter_map(|n| match n {
            Notification::Toast(t) => Some(t),
            _ => None,
        })
        .collect();
    assert_eq!(toasts, vec!["Added 2 track(s)".to_string()]);

    let resp = handle_request(&ctrl, r#"{"command": "tracklist_play_index", "data": 1}"#);
    assert_eq!(resp.response, json!({"play index": 1}));

    let resp = handle_request(&ctrl, r#"{"command": "player_get_current"}"#);
    assert_eq!(resp.response["state"], "playing");
    assert_eq!(resp.response["counter"], "2/2");

    let resp = handle_request(&ctrl, r#"{"command": "player_volume_set", "data": 42}"#);
    assert_eq!(resp.response, json!({"volume": 42}));

    let resp = handle_request(&ctrl, r#"{"command": "player_playback_mode"}"#);
    assert_eq!(resp.response, json!({"playbackmode": "shuffle"}));

    let resp = handle_request(&ctrl, r#"{"command": "tracklist_remove_current"}"#);
    assert_eq!(resp.response, json!({"remove index": [1]}));

    let resp = handle_request(&ctrl, r#"{"command": "tracklist_clear"}"#);
    assert_eq!(resp.response, json!("ok"));
    assert!(ctrl.tracklist().is_empty());
}

#[test]
fn failed_add_toasts_and_reports() {
    let (ctrl, rx) = controller();
    let resp = handle_request(&ctrl, r#"{"command": "tracklist_play_new", "data": "/no/such/dir"}"#);
    assert!(resp.response["error"].as_str().unwrap().contains("not found"));
    assert!(rx.try_iter().any(|n| matches!(n, Notification::Toast(t) if t.starts_with("Nothing added"))));
}
