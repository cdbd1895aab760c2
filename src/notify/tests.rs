use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use serde_json::json;

use super::*;
use crate::mode::PlaybackMode;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn notifications_use_cmd_data_shape() {
    let v = serde_json::to_value(Notification::Volume(40)).unwrap();
    assert_eq!(v, json!({"cmd": "volume", "data": 40}));

    let v = serde_json::to_value(Notification::Mode(PlaybackMode::Loop)).unwrap();
    assert_eq!(v, json!({"cmd": "mode", "data": "loop"}));

    let v = serde_json::to_value(Notification::Toast("Saved".into())).unwrap();
    assert_eq!(v, json!({"cmd": "toast", "data": "Saved"}));
}

#[test]
fn current_state_omits_unknown_fields() {
    let v = serde_json::to_value(Notification::Current(PlayerState::loading())).unwrap();
    assert_eq!(v, json!({"cmd": "current", "data": {"state": "loading"}}));

    let v = serde_json::to_value(PlayerState::empty_tracklist()).unwrap();
    assert_eq!(v, json!({"state": "stopped", "error": "empty tracklist"}));

    let full = PlayerState {
        index: Some(2),
        title: Some("Song".into()),
        counter: "3/8".into(),
        end_reached: true,
        ..PlayerState::bare(PlaybackStatus::Stopped)
    };
    let v = serde_json::to_value(full).unwrap();
    assert_eq!(v["index"], 2);
    assert_eq!(v["counter"], "3/8");
    assert_eq!(v["end_reached"], true);
    assert!(v.get("locator").is_none());
}

#[test]
fn json_lines_sink_writes_one_object_per_line() {
    let buf = SharedBuf::default();
    let sink = JsonLinesSink::new(buf.clone());
    sink.notify(&Notification::Volume(5));
    sink.notify(&Notification::Toast("hi".into()));

    let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], r#"{"cmd":"volume","data":5}"#);
}

#[test]
fn broadcaster_fans_out_to_every_sink() {
    let (tx1, rx1) = mpsc::channel();
    let (tx2, rx2) = mpsc::channel();
    let b = Broadcaster::new()
        .with(ChannelSink::new(tx1))
        .with(ChannelSink::new(tx2));

    b.notify(&Notification::Volume(10));
    assert_eq!(rx1.try_recv().unwrap(), Notification::Volume(10));
    assert_eq!(rx2.try_recv().unwrap(), Notification::Volume(10));
}
