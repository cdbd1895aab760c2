use std::sync::Mutex;

use crate::error::Result;

use super::{VolumeBackend, VolumeKind};

/// A host mixer control.
pub trait MixerDevice: Send + Sync {
    /// Level in percent and whether the control is muted.
    fn read(&self) -> Result<(u8, bool)>;
    fn write(&self, percent: u8) -> Result<()>;
    fn set_muted(&self, muted: bool) -> Result<()>;
}

/// Volume on the host mixer, in steps of `granularity` percent.
pub struct HardwareMixer<D> {
    device: D,
    granularity: u8,
    // Last level observers were told about.
    last_seen: Mutex<Option<u8>>,
}

/// Clamp to 100 and round to the nearest multiple of `granularity`.
pub(crate) fn snap(volume: u8, granularity: u8) -> u8 {
    let g = u16::from(granularity.max(1));
    let v = u16::from(volume.min(100));
    let snapped = (v + g / 2) / g * g;
    if snapped > 100 {
        (100 / g * g) as u8
    } else {
        snapped as u8
    }
}

impl<D: MixerDevice> HardwareMixer<D> {
    pub fn new(device: D, granularity: u8) -> Self {
        Self {
            device,
            granularity: granularity.max(1),
            last_seen: Mutex::new(None),
        }
    }

    fn remember(&self, level: u8) -> u8 {
        *self.last_seen.lock().unwrap_or_else(|e| e.into_inner()) = Some(level);
        level
    }

    fn write_snapped(&self, volume: u8) -> Result<u8> {
        let level = snap(volume, self.granularity);
        self.device.write(level)?;
        let (_, muted) = self.device.read()?;
        if muted {
            self.device.set_muted(false)?;
        }
        Ok(self.remember(level))
    }
}

impl<D: MixerDevice> VolumeBackend for HardwareMixer<D> {
    fn kind(&self) -> VolumeKind {
        VolumeKind::Hardware
    }

    fn volume(&self) -> Result<u8> {
        let (level, muted) = self.device.read()?;
        Ok(if muted { 0 } else { level })
    }

    fn set_volume(&self, volume: u8) -> Result<u8> {
        self.write_snapped(volume)
    }

    // A step under the granularity would snap straight back, so move at
    // least one whole mixer step.
    fn volume_up(&self, step: u8) -> Result<u8> {
        let (level, _) = self.device.read()?;
        self.write_snapped(level.saturating_add(step.max(self.granularity)))
    }

    fn volume_down(&self, step: u8) -> Result<u8> {
        let (level, _) = self.device.read()?;
        self.write_snapped(level.saturating_sub(step.max(self.granularity)))
    }

    fn toggle_mute(&self) -> Result<u8> {
        let (_, muted) = self.device.read()?;
        self.device.set_muted(!muted)?;
        let now = self.volume()?;
        Ok(self.remember(now))
    }

    fn on_engine_volume_changed(&self, _engine_volume: u8) -> Option<u8> {
        // The engine is pinned at 100; only the mixer level matters.
        None
    }

    fn poll_external_change(&self) -> Result<Option<u8>> {
        let now = self.volume()?;
        let mut last = self.last_seen.lock().unwrap_or_else(|e| e.into_inner());
        if *last == Some(now) {
            return Ok(None);
        }
        *last = Some(now);
        Ok(Some(now))
    }
}
