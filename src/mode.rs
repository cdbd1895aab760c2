//! Playback mode engine: picks the next index to play.

mod machine;

pub use machine::{ModeEngine, PlaybackMode, SHUFFLE_HISTORY_CAP};
