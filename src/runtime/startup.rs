use std::sync::Arc;

use tracing::{info, warn};

use crate::config;
use crate::controller::Controller;
use crate::engine::PlaybackEngine;
use crate::volume::{AmixerDevice, HardwareMixer, SoftwareVolume, VolumeBackend, VolumeKind};

/// Pick the volume backend once: the host mixer if one is usable, else the engine.
pub fn select_volume_backend(
    settings: &config::Settings,
    engine: Arc<dyn PlaybackEngine>,
) -> Box<dyn VolumeBackend> {
    if settings.player.force_software_volume {
        info!("software volume (forced by config)");
        return Box::new(SoftwareVolume::new(engine));
    }
    match AmixerDevice::detect() {
        Some(device) => {
            info!(control = device.control(), "hardware mixer volume");
            Box::new(HardwareMixer::new(
                device,
                settings.player.hardware_volume_granularity,
            ))
        }
        None => {
            info!("no hardware mixer found, using software volume");
            Box::new(SoftwareVolume::new(engine))
        }
    }
}

pub fn apply_playback_defaults(ctrl: &Controller, kind: VolumeKind, settings: &config::Settings) {
    ctrl.set_mode(settings.player.default_mode.into());

    // The hardware mixer keeps whatever level the host had.
    if kind == VolumeKind::Software {
        if let Err(e) = ctrl.set_volume(i64::from(settings.player.default_volume)) {
            warn!(error = %e, "cannot apply default volume");
        }
    }
}

/// Start playing `locator` right away (from the command line). Blocks
/// until the first switch settles.
pub fn play_initial(ctrl: &Controller, locator: &str) {
    let outcome = match ctrl.new_tracklist(&[locator.to_string()]) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(%locator, error = %e, "cannot play initial locator");
            return;
        }
    };
    info!(added = outcome.added, %locator, "initial tracklist");
    if let Some(pending) = outcome.pending {
        if let Err(e) = pending.wait() {
            warn!(%locator, error = %e, "initial playback did not start");
        }
    }
}
