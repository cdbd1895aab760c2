use std::sync::{Arc, Mutex};

use crate::engine::PlaybackEngine;
use crate::error::Result;

use super::{VolumeBackend, VolumeKind};

/// Volume held by the playback engine itself.
pub struct SoftwareVolume {
    engine: Arc<dyn PlaybackEngine>,
    // Level to restore on unmute; `Some` while muted.
    muted_from: Mutex<Option<u8>>,
}

impl SoftwareVolume {
    pub fn new(engine: Arc<dyn PlaybackEngine>) -> Self {
        Self {
            engine,
            muted_from: Mutex::new(None),
        }
    }

    fn muted_from(&self) -> std::sync::MutexGuard<'_, Option<u8>> {
        self.muted_from.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn apply(&self, volume: u8) -> u8 {
        let volume = volume.min(100);
        self.engine.set_volume(volume);
        volume
    }
}

impl VolumeBackend for SoftwareVolume {
    fn kind(&self) -> VolumeKind {
        VolumeKind::Software
    }

    fn volume(&self) -> Result<u8> {
        if self.muted_from().is_some() {
            return Ok(0);
        }
        Ok(self.engine.volume())
    }

    fn set_volume(&self, volume: u8) -> Result<u8> {
        *self.muted_from() = None;
        Ok(self.apply(volume))
    }

    fn volume_up(&self, step: u8) -> Result<u8> {
        if let Some(prev) = self.muted_from().take() {
            return Ok(self.apply(prev));
        }
        Ok(self.apply(self.engine.volume().saturating_add(step)))
    }

    fn volume_down(&self, step: u8) -> Result<u8> {
        if self.muted_from().is_some() {
            return Ok(0);
        }
        Ok(self.apply(self.engine.volume().saturating_sub(step)))
    }

    fn toggle_mute(&self) -> Result<u8> {
        let mut muted = self.muted_from();
        match muted.take() {
            Some(prev) => Ok(self.apply(prev)),
            None => {
                *muted = Some(self.engine.volume());
                Ok(self.apply(0))
            }
        }
    }

    fn on_engine_volume_changed(&self, engine_volume: u8) -> Option<u8> {
        Some(engine_volume)
    }
}
