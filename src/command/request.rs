use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Raw request as it arrives on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub command: String,
    #[serde(default)]
    pub data: Value,
}

/// A validated command. Payloads are checked before any state is touched.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    TogglePause,
    Stop,
    Next,
    Previous,
    ToggleMode,
    GetCurrent,
    SetPosition(f64),
    VolumeUp,
    VolumeDown,
    VolumeMute,
    VolumeGet,
    VolumeSet(i64),
    TracklistGet,
    TracklistPlayNew(Vec<String>),
    TracklistAdd(Vec<String>),
    TracklistAddRandom {
        root: PathBuf,
        count: usize,
        clear_first: bool,
    },
    TracklistPlayIndex(usize),
    TracklistRemove(BTreeSet<usize>),
    TracklistRemoveCurrent,
    TracklistClear,
    PlaylistSave(String),
    PlaylistRename { old: String, new: String },
    PlaylistDelete(String),
}

impl Command {
    /// Parse `name` + `data`. `Ok(None)` means the name is not a command.
    pub fn parse(name: &str, data: &Value) -> Result<Option<Self>> {
        let cmd = match name {
            "player_play" => Self::Play,
            "player_pause" => Self::Pause,
            "player_toggle_pause" => Self::TogglePause,
            "player_stop" => Self::Stop,
            "player_next" => Self::Next,
            "player_previous" => Self::Previous,
            "player_playback_mode" => Self::ToggleMode,
            "player_get_current" => Self::GetCurrent,
            "player_set_position" => Self::SetPosition(float(data)?),
            "player_volume_up" => Self::VolumeUp,
            "player_volume_down" => Self::VolumeDown,
            "player_volume_mute" => Self::VolumeMute,
            "player_volume_get" => Self::VolumeGet,
            "player_volume_set" => Self::VolumeSet(int(data)?),
            "tracklist_get" | "tracklist_update" => Self::TracklistGet,
            "tracklist_play_new" => Self::TracklistPlayNew(locators(data)?),
            "tracklist_add" => Self::TracklistAdd(locators(data)?),
            "tracklist_add_random" => random_sample(data)?,
            "tracklist_play_index" => Self::TracklistPlayIndex(index(data)?),
            "tracklist_remove_index" => Self::TracklistRemove(indices(data)?),
            "tracklist_remove_current" => Self::TracklistRemoveCurrent,
            "tracklist_clear" => Self::TracklistClear,
            "playlist_save" => Self::PlaylistSave(string(data, "playlist name")?),
            "playlist_rename" => {
                let [old, new] = pair(data)?;
                Self::PlaylistRename { old, new }
            }
            "playlist_delete" => Self::PlaylistDelete(string(data, "playlist name")?),
            _ => return Ok(None),
        };
        Ok(Some(cmd))
    }
}

fn invalid(what: &str, data: &Value) -> Error {
    Error::Validation(format!("expected {what}, got {data}"))
}

fn int(data: &Value) -> Result<i64> {
    match data {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or_else(|| invalid("an integer", data)),
        Value::String(s) => s.trim().parse().map_err(|_| invalid("an integer", data)),
        _ => Err(invalid("an integer", data)),
    }
}

fn index(data: &Value) -> Result<usize> {
    let i = int(data)?;
    usize::try_from(i).map_err(|_| invalid("a non-negative index", data))
}

fn float(data: &Value) -> Result<f64> {
    match data {
        Value::Number(n) => n.as_f64().ok_or_else(|| invalid("a number", data)),
        Value::String(s) => s.trim().parse().map_err(|_| invalid("a number", data)),
        _ => Err(invalid("a number", data)),
    }
}

/// `true`/`false`, or 0/1 as number or string.
fn flag(data: &Value) -> Result<bool> {
    match data {
        Value::Bool(b) => Ok(*b),
        _ => Ok(int(data).map_err(|_| invalid("a boolean", data))? != 0),
    }
}

fn string(data: &Value, what: &str) -> Result<String> {
    match data {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(invalid(what, data)),
    }
}

fn locators(data: &Value) -> Result<Vec<String>> {
    match data {
        Value::String(_) => Ok(vec![string(data, "a locator")?]),
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| string(item, "a locator"))
            .collect(),
        _ => Err(invalid("a locator or a list of locators", data)),
    }
}

fn indices(data: &Value) -> Result<BTreeSet<usize>> {
    match data {
        Value::Array(items) if !items.is_empty() => items.iter().map(index).collect(),
        Value::Array(_) => Err(invalid("at least one index", data)),
        _ => Ok(BTreeSet::from([index(data)?])),
    }
}

fn pair(data: &Value) -> Result<[String; 2]> {
    match data.as_array().map(Vec::as_slice) {
        Some([a, b]) => Ok([string(a, "a playlist name")?, string(b, "a playlist name")?]),
        _ => Err(invalid("[old, new]", data)),
    }
}

fn random_sample(data: &Value) -> Result<Command> {
    let Some([root, count, clear_first]) = data.as_array().map(Vec::as_slice) else {
        return Err(invalid("[root, count, clear_first]", data));
    };
    let count = usize::try_from(int(count)?).map_err(|_| invalid("a positive count", count))?;
    if count == 0 {
        return Err(Error::Validation("sample size must be at least 1".into()));
    }
    Ok(Command::TracklistAddRandom {
        root: PathBuf::from(string(root, "a root directory")?),
        count,
        clear_first: flag(clear_first)?,
    })
}
