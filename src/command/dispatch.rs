use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::controller::{AddOutcome, Controller};
use crate::error::Result;

use super::request::{Command, Request};

/// Reply to one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub command: String,
    pub response: Value,
}

impl Response {
    fn invalid(reason: impl std::fmt::Display) -> Self {
        Self {
            command: "invalid".into(),
            response: json!({ "error": reason.to_string() }),
        }
    }
}

/// Parse and run one JSON request line. Never fails: every error becomes
/// a response payload.
pub fn handle_request(ctrl: &Controller, line: &str) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => return Response::invalid(format!("malformed request: {e}")),
    };
    debug!(command = %request.command, "request");

    let cmd = match Command::parse(&request.command, &request.data) {
        Ok(Some(cmd)) => cmd,
        Ok(None) => return Response::invalid(format!("unknown command {}", request.command)),
        Err(e) => {
            return Response {
                command: request.command,
                response: json!({ "error": e.to_string() }),
            };
        }
    };

    let response = match execute(ctrl, cmd) {
        Ok(v) => v,
        Err(e) => {
            warn!(command = %request.command, error = %e, "command failed");
            json!({ "error": e.to_string() })
        }
    };
    Response {
        command: request.command,
        response,
    }
}

/// Run a validated command against the controller.
pub fn execute(ctrl: &Controller, cmd: Command) -> Result<Value> {
    Ok(match cmd {
        Command::Play => json!(ctrl.play()?),
        Command::Pause => json!(ctrl.pause()),
        Command::TogglePause => json!(ctrl.toggle_pause()?),
        Command::Stop => json!(ctrl.stop()),
        Command::Next => {
            let pending = ctrl.advance()?;
            json!({ "state": "loading", "index": pending.target() })
        }
        Command::Previous => {
            let pending = ctrl.retreat()?;
            json!({ "state": "loading", "index": pending.target() })
        }
        Command::ToggleMode => json!({ "playbackmode": ctrl.toggle_mode() }),
        Command::GetCurrent => json!(ctrl.state()),
        Command::SetPosition(fraction) => {
            let report = ctrl.set_position(fraction)?;
            json!({
                "percent": report.percent,
                "position": report.position_millis,
                "duration": report.duration_millis,
            })
        }
        Command::VolumeUp => json!({ "volume": ctrl.volume_up()? }),
        Command::VolumeDown => json!({ "volume": ctrl.volume_down()? }),
        Command::VolumeMute => json!({ "volume": ctrl.toggle_mute()? }),
        Command::VolumeGet => json!({ "volume": ctrl.volume()? }),
        Command::VolumeSet(v) => json!({ "volume": ctrl.set_volume(v)? }),
        Command::TracklistGet => json!({ "tracklist": ctrl.tracklist() }),
        Command::TracklistPlayNew(locators) => {
            let outcome = toast_result(ctrl, ctrl.new_tracklist(&locators), "Playing")?;
            json!({ "tracklist": ctrl.tracklist(), "added": outcome })
        }
        Command::TracklistAdd(locators) => {
            let outcome = toast_result(ctrl, ctrl.add(&locators), "Added")?;
            json!({ "tracklist": ctrl.tracklist(), "added": outcome })
        }
        Command::TracklistAddRandom {
            root,
            count,
            clear_first,
        } => {
            let result = ctrl.add_random_sample(&root, count, clear_first);
            let outcome = toast_result(ctrl, result, "Added")?;
            json!({ "tracklist": ctrl.tracklist(), "added": outcome })
        }
        Command::TracklistPlayIndex(i) => {
            ctrl.play_at_index(i)?;
            json!({ "play index": i })
        }
        Command::TracklistRemove(indices) => json!({ "remove index": ctrl.remove_indices(&indices)? }),
        Command::TracklistRemoveCurrent => json!({ "remove index": ctrl.remove_current()? }),
        Command::TracklistClear => {
            ctrl.clear();
            json!("ok")
        }
        Command::PlaylistSave(name) => match ctrl.save_playlist(&name) {
            Ok(path) => {
                ctrl.toast(format!("Saved playlist {name}"));
                json!({ "playlist": path })
            }
            Err(e) => {
                ctrl.toast(format!("Could not save playlist: {e}"));
                return Err(e);
            }
        },
        Command::PlaylistRename { old, new } => match ctrl.rename_playlist(&old, &new) {
            Ok(path) => {
                ctrl.toast(format!("Renamed playlist {old} to {new}"));
                json!({ "playlist": path })
            }
            Err(e) => {
                ctrl.toast(format!("Could not rename playlist: {e}"));
                return Err(e);
            }
        },
        Command::PlaylistDelete(name) => match ctrl.delete_playlist(&name) {
            Ok(()) => {
                ctrl.toast(format!("Deleted playlist {name}"));
                json!("ok")
            }
            Err(e) => {
                ctrl.toast(format!("Could not delete playlist: {e}"));
                return Err(e);
            }
        },
    })
}

/// Toast the outcome of an add-style command and hand back the count.
/// A started switch is left to finish on its own.
fn toast_result(ctrl: &Controller, result: Result<AddOutcome>, verb: &str) -> Result<usize> {
    match result {
        Ok(outcome) => {
            let mut msg = format!("{verb} {} track(s)", outcome.added);
            if !outcome.skipped.is_empty() {
                msg.push_str(&format!(", skipped {}", outcome.skipped.len()));
            }
            ctrl.toast(msg);
            Ok(outcome.added)
        }
        Err(e) => {
            ctrl.toast(format!("Nothing added: {e}"));
            Err(e)
        }
    }
}
