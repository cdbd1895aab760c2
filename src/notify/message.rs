use serde::Serialize;

use crate::mode::PlaybackMode;
use crate::tracklist::TrackRecord;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
    Loading,
}

/// Snapshot of what the player is doing, derived on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerState {
    pub state: PlaybackStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_millis: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_millis: Option<u64>,
    /// Playback progress through the current item, 0..=1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f32>,
    /// "3/8" style position indicator; empty when idle.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub counter: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub end_reached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlayerState {
    pub fn bare(state: PlaybackStatus) -> Self {
        Self {
            state,
            index: None,
            locator: None,
            artist: None,
            title: None,
            position_millis: None,
            duration_millis: None,
            progress: None,
            counter: String::new(),
            end_reached: false,
            error: None,
        }
    }

    pub fn loading() -> Self {
        Self::bare(PlaybackStatus::Loading)
    }

    pub fn empty_tracklist() -> Self {
        Self {
            error: Some("empty tracklist".into()),
            ..Self::bare(PlaybackStatus::Stopped)
        }
    }
}

/// Wire shape `{"cmd": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cmd", content = "data", rename_all = "lowercase")]
pub enum Notification {
    Current(PlayerState),
    Tracklist(Vec<TrackRecord>),
    Volume(u8),
    Mode(PlaybackMode),
    Toast(String),
}
