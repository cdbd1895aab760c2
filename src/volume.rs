//! Volume backends. Exactly one is chosen at startup: the host's hardware
//! mixer when one is found, otherwise the engine's own volume.

mod amixer;
mod hardware;
mod software;

pub use amixer::AmixerDevice;
pub use hardware::{HardwareMixer, MixerDevice};
pub use software::SoftwareVolume;

use crate::error::Result;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VolumeKind {
    Hardware,
    Software,
}

/// Volume control as the controller sees it. Every setter returns the
/// level that is now in effect.
pub trait VolumeBackend: Send + Sync {
    fn kind(&self) -> VolumeKind;
    /// Current level; 0 while muted.
    fn volume(&self) -> Result<u8>;
    fn set_volume(&self, volume: u8) -> Result<u8>;
    fn volume_up(&self, step: u8) -> Result<u8>;
    fn volume_down(&self, step: u8) -> Result<u8>;
    fn toggle_mute(&self) -> Result<u8>;
    /// React to the engine reporting a volume change. Returns the level to
    /// broadcast, if observers should hear about it.
    fn on_engine_volume_changed(&self, engine_volume: u8) -> Option<u8>;
    /// Level changed outside the controller since the last call.
    fn poll_external_change(&self) -> Result<Option<u8>> {
        Ok(None)
    }
}
