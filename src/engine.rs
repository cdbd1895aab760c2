//! Playback engine: the trait the controller drives and its rodio backend.

mod player;
mod sink;
#[cfg(test)]
pub(crate) mod testing;
mod thread;
mod types;

pub use player::RodioEngine;
pub use types::{EngineEvent, MediaHandle, PlaybackEngine};
