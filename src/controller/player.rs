use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info};

use crate::config::{LibrarySettings, Settings};
use crate::engine::PlaybackEngine;
use crate::error::{Error, Result};
use crate::library::MetadataWorker;
use crate::mode::{ModeEngine, PlaybackMode};
use crate::notify::{Notification, NotificationSink, PlaybackStatus, PlayerState};
use crate::playlist::PlaylistStore;
use crate::tracklist::Tracklist;
use crate::volume::{VolumeBackend, VolumeKind};

/// Everything guarded by the controller lock.
pub(super) struct Core {
    pub tracklist: Tracklist,
    pub modes: ModeEngine,
    /// Soft-stopped: paused at the start of the item.
    pub stopped: bool,
    /// The last sequential item finished.
    pub end_reached: bool,
}

pub(super) struct Inner {
    pub engine: Arc<dyn PlaybackEngine>,
    pub volume: Box<dyn VolumeBackend>,
    pub sink: Arc<dyn NotificationSink>,
    pub metadata: Option<MetadataWorker>,
    pub playlists: Option<PlaylistStore>,
    pub library: LibrarySettings,
    pub volume_step: u8,
    pub ready_attempts: u32,
    pub ready_interval: Duration,
    pub mixer_interval: Duration,
    pub core: Mutex<Core>,
}

/// Collaborators handed to the controller at construction.
pub struct ControllerParts {
    pub engine: Arc<dyn PlaybackEngine>,
    pub volume: Box<dyn VolumeBackend>,
    pub sink: Arc<dyn NotificationSink>,
    pub metadata: Option<MetadataWorker>,
    pub playlists: Option<PlaylistStore>,
    pub modes: ModeEngine,
}

/// Result of a seek.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekReport {
    pub percent: f32,
    pub position_millis: u64,
    pub duration_millis: u64,
}

/// Cheap, cloneable handle; every clone drives the same player.
#[derive(Clone)]
pub struct Controller {
    pub(super) inner: Arc<Inner>,
}

impl Controller {
    pub fn new(parts: ControllerParts, settings: &Settings) -> Self {
        if parts.volume.kind() == VolumeKind::Hardware {
            // The mixer does the attenuation.
            parts.engine.set_volume(100);
        }
        let player = &settings.player;
        Self {
            inner: Arc::new(Inner {
                engine: parts.engine,
                volume: parts.volume,
                sink: parts.sink,
                metadata: parts.metadata,
                playlists: parts.playlists,
                library: settings.library.clone(),
                volume_step: player.volume_step.max(1),
                ready_attempts: player.ready_poll_attempts.max(1),
                ready_interval: Duration::from_millis(player.ready_poll_interval_ms),
                mixer_interval: Duration::from_millis(player.mixer_poll_interval_ms.max(1)),
                core: Mutex::new(Core {
                    tracklist: Tracklist::new(),
                    modes: parts.modes,
                    stopped: false,
                    end_reached: false,
                }),
            }),
        }
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, Core> {
        self.inner.core.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(super) fn notify(&self, note: Notification) {
        self.inner.sink.notify(&note);
    }

    pub fn toast(&self, message: impl Into<String>) {
        self.notify(Notification::Toast(message.into()));
    }

    pub(super) fn current_index(&self, core: &Core) -> Option<usize> {
        self.inner
            .engine
            .current_handle()
            .and_then(|h| core.tracklist.index_of(h))
    }

    pub(super) fn derive_state(&self, core: &Core) -> PlayerState {
        if core.tracklist.is_empty() {
            return PlayerState::empty_tracklist();
        }
        let engine = &self.inner.engine;
        let current = self.current_index(core);
        let status = if core.stopped || core.end_reached {
            PlaybackStatus::Stopped
        } else if engine.is_playing() {
            PlaybackStatus::Playing
        } else if current.is_some() {
            PlaybackStatus::Paused
        } else {
            PlaybackStatus::Stopped
        };

        let mut state = PlayerState::bare(status);
        state.counter = core.tracklist.position_summary(current);
        state.end_reached = core.end_reached;
        if let Some(rec) = current.and_then(|i| core.tracklist.get(i)) {
            state.index = Some(rec.index);
            state.locator = Some(rec.locator.clone());
            state.artist = Some(rec.artist.clone());
            state.title = Some(rec.title.clone());
            state.position_millis = Some(engine.time_millis());
            state.progress = Some(engine.position());
            state.duration_millis = Some(if rec.duration_millis > 0 {
                rec.duration_millis
            } else {
                engine.duration_millis()
            });
        }
        state
    }

    /// Current player state, derived from the engine and the tracklist.
    pub fn state(&self) -> PlayerState {
        let core = self.lock();
        self.derive_state(&core)
    }

    pub fn tracklist(&self) -> Vec<crate::tracklist::TrackRecord> {
        self.lock().tracklist.records().to_vec()
    }

    #[cfg(test)]
    pub fn mode(&self) -> PlaybackMode {
        self.lock().modes.mode()
    }

    /// Send `current`. Returns what was sent.
    pub(super) fn publish_current(&self) -> PlayerState {
        let state = self.state();
        self.notify(Notification::Current(state.clone()));
        state
    }

    /// Send the `current` + `tracklist` pair observers need after any
    /// structural change.
    pub(super) fn publish(&self) {
        let (state, records) = {
            let core = self.lock();
            (self.derive_state(&core), core.tracklist.records().to_vec())
        };
        self.notify(Notification::Current(state));
        self.notify(Notification::Tracklist(records));
    }

    pub fn play(&self) -> Result<PlayerState> {
        {
            let mut core = self.lock();
            if core.tracklist.is_empty() {
                return Err(Error::EmptyTracklist);
            }
            let engine = &self.inner.engine;
            // After the end of the list, start over.
            if core.end_reached || self.current_index(&core).is_none() {
                engine.play_at(0)?;
            } else {
                engine.resume();
            }
            core.stopped = false;
            core.end_reached = false;
        }
        Ok(self.publish_current())
    }

    pub fn pause(&self) -> PlayerState {
        self.inner.engine.set_pause(true);
        self.publish_current()
    }

    pub fn toggle_pause(&self) -> Result<PlayerState> {
        let stopped = {
            let core = self.lock();
            core.stopped || core.end_reached
        };
        if stopped || !self.inner.engine.is_playing() {
            self.play()
        } else {
            Ok(self.pause())
        }
    }

    /// Soft stop: pause, rewind, and report stopped. The item stays loaded.
    pub fn stop(&self) -> PlayerState {
        {
            let mut core = self.lock();
            self.inner.engine.set_pause(true);
            self.inner.engine.set_position(0.0);
            core.stopped = true;
        }
        self.publish_current()
    }

    /// Jump straight to `index`, ignoring the playback mode.
    pub fn play_at_index(&self, index: usize) -> Result<PlayerState> {
        {
            let mut core = self.lock();
            if core.tracklist.is_empty() {
                return Err(Error::EmptyTracklist);
            }
            if index >= core.tracklist.len() {
                return Err(Error::NotFound(format!("no track at index {index}")));
            }
            self.inner.engine.play_at(index)?;
            core.stopped = false;
            core.end_reached = false;
        }
        debug!(index, "play at index");
        Ok(self.publish_current())
    }

    pub fn set_position(&self, fraction: f64) -> Result<SeekReport> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(Error::Validation(format!(
                "position must be within 0..1, got {fraction}"
            )));
        }
        let engine = &self.inner.engine;
        {
            let core = self.lock();
            if core.tracklist.is_empty() {
                return Err(Error::EmptyTracklist);
            }
            engine.set_position(fraction as f32);
        }
        Ok(SeekReport {
            percent: fraction as f32,
            position_millis: engine.time_millis(),
            duration_millis: engine.duration_millis(),
        })
    }

    pub fn volume(&self) -> Result<u8> {
        self.inner.volume.volume()
    }

    /// Set the volume; out-of-range requests are clamped to 0..=100.
    pub fn set_volume(&self, volume: i64) -> Result<u8> {
        let clamped = volume.clamp(0, 100) as u8;
        let now = self.inner.volume.set_volume(clamped)?;
        self.notify(Notification::Volume(now));
        Ok(now)
    }

    pub fn volume_up(&self) -> Result<u8> {
        let now = self.inner.volume.volume_up(self.inner.volume_step)?;
        self.notify(Notification::Volume(now));
        Ok(now)
    }

    pub fn volume_down(&self) -> Result<u8> {
        let now = self.inner.volume.volume_down(self.inner.volume_step)?;
        self.notify(Notification::Volume(now));
        Ok(now)
    }

    pub fn toggle_mute(&self) -> Result<u8> {
        let now = self.inner.volume.toggle_mute()?;
        self.notify(Notification::Volume(now));
        Ok(now)
    }

    /// Step the mode cycle; history is cleared on every change.
    pub fn toggle_mode(&self) -> PlaybackMode {
        let mode = {
            let mut core = self.lock();
            let mode = core.modes.toggle();
            self.inner.engine.set_repeat(mode == PlaybackMode::Loop);
            mode
        };
        info!(?mode, "playback mode");
        self.notify(Notification::Mode(mode));
        mode
    }

    pub fn set_mode(&self, mode: PlaybackMode) {
        let mut core = self.lock();
        core.modes.set_mode(mode);
        self.inner.engine.set_repeat(mode == PlaybackMode::Loop);
    }
}
