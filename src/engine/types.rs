//! Engine-facing types: the command surface every playback backend offers
//! and the asynchronous events it reports back.

use crate::error::Result;
use crate::library::TrackMetadata;

/// Opaque identity the engine assigns to an enqueued item.
///
/// Indices shift on every insert/remove; handles never do.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaHandle(pub u64);

/// Signals emitted by the engine (and the metadata worker) on their own threads.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// An item started (or resumed) playing.
    Started,
    /// Playback paused, or a target was loaded without starting it.
    Paused,
    /// The engine was unloaded or could not play the target.
    Stopped,
    /// The current item played to its end.
    EndReached,
    VolumeChanged(u8),
    /// Tags for `handle` have been read.
    MetadataReady {
        handle: MediaHandle,
        metadata: TrackMetadata,
    },
}

/// The playback engine the controller drives. Implementations must be
/// cheap to call: every method returns promptly and reports progress
/// through `EngineEvent`s instead of blocking.
pub trait PlaybackEngine: Send + Sync {
    /// Append `locator` to the engine's list and return its handle.
    fn enqueue(&self, locator: &str) -> MediaHandle;
    /// Drop the item at `index`.
    fn remove_at(&self, index: usize) -> Result<()>;
    /// Switch to the item at `index` and start playing it.
    fn play_at(&self, index: usize) -> Result<()>;
    /// Point the engine at `index` without starting playback; `None` unloads.
    fn set_target(&self, index: Option<usize>) -> Result<()>;
    /// Resume (or start) the current target.
    fn resume(&self);
    fn set_pause(&self, paused: bool);
    /// Seek inside the current item, `fraction` in `[0, 1]`.
    fn set_position(&self, fraction: f32);
    /// Position inside the current item as a fraction, 0 when unknown.
    fn position(&self) -> f32;
    fn time_millis(&self) -> u64;
    fn duration_millis(&self) -> u64;
    fn volume(&self) -> u8;
    fn set_volume(&self, volume: u8);
    /// Replay the current item natively when it ends.
    fn set_repeat(&self, repeat: bool);
    fn current_handle(&self) -> Option<MediaHandle>;
    fn is_playing(&self) -> bool;
    /// True once the engine has finished processing earlier target changes.
    fn will_accept_new_target(&self) -> bool;
    /// Whether network stream locators (`http(s)://`) can be played.
    fn plays_streams(&self) -> bool;
}
