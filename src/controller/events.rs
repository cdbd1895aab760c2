//! Reactions to engine events, processed on one dedicated thread.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::engine::EngineEvent;
use crate::mode::PlaybackMode;
use crate::notify::Notification;
use crate::volume::VolumeKind;

use super::player::Controller;
use super::switch::{PendingSwitch, SwitchTarget, Trigger};

impl Controller {
    /// Consume engine events until every sender is gone.
    pub fn spawn_event_loop(&self, events: Receiver<EngineEvent>) -> std::io::Result<JoinHandle<()>> {
        let ctrl = self.clone();
        thread::Builder::new()
            .name("engine-events".into())
            .spawn(move || {
                for event in events {
                    // Auto-advance switches report their own failures.
                    let _ = ctrl.handle_event(event);
                }
                debug!("engine event channel closed");
            })
    }

    /// Apply one engine event. Returns the switch it started, if any.
    pub fn handle_event(&self, event: EngineEvent) -> Option<PendingSwitch> {
        match event {
            EngineEvent::EndReached => return self.on_end_reached(),
            // A paused retarget lands here too, after the command already replied.
            EngineEvent::Started | EngineEvent::Paused | EngineEvent::Stopped => {
                self.publish_current();
            }
            EngineEvent::VolumeChanged(v) => {
                if let Some(level) = self.inner.volume.on_engine_volume_changed(v) {
                    self.notify(Notification::Volume(level));
                }
            }
            EngineEvent::MetadataReady { handle, metadata } => {
                let snapshot = {
                    let mut core = self.lock();
                    match core.tracklist.apply_metadata(handle, &metadata) {
                        Some(true) => {
                            core.tracklist.reindex_all();
                            Some(core.tracklist.records().to_vec())
                        }
                        Some(false) => None,
                        None => {
                            debug!(?handle, "metadata for a removed track");
                            None
                        }
                    }
                };
                // One snapshot per batch, once the last record resolves.
                if let Some(records) = snapshot {
                    self.notify(Notification::Tracklist(records));
                }
            }
        }
        None
    }

    fn on_end_reached(&self) -> Option<PendingSwitch> {
        // Mode, target and the end flag come from one lock scope.
        let plan = {
            let mut core = self.lock();
            match core.modes.mode() {
                // The engine repeats on its own.
                PlaybackMode::Loop => return None,
                PlaybackMode::Shuffle => self.plan_advance(&mut core).map(Some),
                PlaybackMode::Sequential => {
                    let count = core.tracklist.len();
                    match self.current_index(&core) {
                        Some(i) if i + 1 < count => SwitchTarget::at(&core, i + 1).map(Some),
                        _ => {
                            core.end_reached = true;
                            Ok(None)
                        }
                    }
                }
            }
        };

        let result = match plan {
            Ok(Some(target)) => self.start_switch(target, 1, Trigger::EndOfTrack),
            Ok(None) => {
                info!("end of tracklist");
                self.publish_current();
                return None;
            }
            Err(e) => Err(e),
        };
        match result {
            Ok(pending) => Some(pending),
            Err(e) => {
                warn!(error = %e, "auto-advance failed");
                None
            }
        }
    }

    /// Broadcast hardware mixer changes made outside the controller.
    /// Does nothing for the software backend.
    pub fn spawn_mixer_poll(&self) -> Option<JoinHandle<()>> {
        if self.inner.volume.kind() != VolumeKind::Hardware {
            return None;
        }
        let weak = Arc::downgrade(&self.inner);
        let interval = self.inner.mixer_interval;
        let spawned = thread::Builder::new()
            .name("mixer-poll".into())
            .spawn(move || {
                loop {
                    thread::sleep(interval);
                    let Some(inner) = weak.upgrade() else {
                        break;
                    };
                    match inner.volume.poll_external_change() {
                        Ok(Some(level)) => inner.sink.notify(&Notification::Volume(level)),
                        Ok(None) => {}
                        Err(e) => warn!(error = %e, "mixer poll failed"),
                    }
                }
            });
        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "cannot start mixer poll");
                None
            }
        }
    }
}
