//! `RodioEngine`: the production `PlaybackEngine`, a thin handle that
//! forwards commands to the audio thread and reads back shared state.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::error::{Error, Result};

use super::thread::{EngineCmd, EngineState, Entry, StateHandle, lock, spawn_audio_thread};
use super::types::{EngineEvent, MediaHandle, PlaybackEngine};

pub struct RodioEngine {
    tx: Sender<EngineCmd>,
    state: StateHandle,
    // Target changes sent to the audio thread and not yet applied.
    pending: Arc<AtomicUsize>,
    next_handle: AtomicU64,
}

impl RodioEngine {
    /// Open the default output device on a dedicated audio thread.
    ///
    /// Fails when no device can be opened; the thread reports that back
    /// before this returns.
    pub fn new(events: Sender<EngineEvent>) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let state: StateHandle = Arc::new(Mutex::new(EngineState {
            volume: 100,
            ..EngineState::default()
        }));
        let pending = Arc::new(AtomicUsize::new(0));

        spawn_audio_thread(rx, state.clone(), pending.clone(), events, ready_tx)?;
        ready_rx
            .recv()
            .map_err(|_| Error::Engine("audio thread exited during startup".into()))??;

        Ok(Self {
            tx,
            state,
            pending,
            next_handle: AtomicU64::new(1),
        })
    }

    /// Stop playback and let the audio thread exit.
    pub fn quit(&self) {
        let _ = self.tx.send(EngineCmd::Quit);
    }

    fn send(&self, cmd: EngineCmd) {
        if self.tx.send(cmd).is_err() {
            warn!("audio thread is gone; command dropped");
        }
    }

    fn send_target(&self, cmd: EngineCmd) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(cmd).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            warn!("audio thread is gone; target change dropped");
        }
    }

    fn entry_at(&self, index: usize) -> Result<(MediaHandle, String)> {
        let st = lock(&self.state);
        st.entries
            .get(index)
            .map(|e| (e.handle, e.locator.clone()))
            .ok_or_else(|| Error::Validation(format!("no engine item at index {index}")))
    }
}

impl PlaybackEngine for RodioEngine {
    fn enqueue(&self, locator: &str) -> MediaHandle {
        let handle = MediaHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        lock(&self.state).entries.push(Entry {
            handle,
            locator: locator.to_string(),
        });
        handle
    }

    fn remove_at(&self, index: usize) -> Result<()> {
        let mut st = lock(&self.state);
        if index >= st.entries.len() {
            return Err(Error::Validation(format!("no engine item at index {index}")));
        }
        st.entries.remove(index);
        Ok(())
    }

    fn play_at(&self, index: usize) -> Result<()> {
        let (handle, locator) = self.entry_at(index)?;
        self.send_target(EngineCmd::Load {
            handle,
            locator,
            play: true,
        });
        Ok(())
    }

    fn set_target(&self, index: Option<usize>) -> Result<()> {
        match index {
            Some(i) => {
                let (handle, locator) = self.entry_at(i)?;
                self.send_target(EngineCmd::Load {
                    handle,
                    locator,
                    play: false,
                });
            }
            None => self.send_target(EngineCmd::Unload),
        }
        Ok(())
    }

    fn resume(&self) {
        self.send(EngineCmd::Resume);
    }

    fn set_pause(&self, paused: bool) {
        self.send(if paused {
            EngineCmd::Pause
        } else {
            EngineCmd::Resume
        });
    }

    fn set_position(&self, fraction: f32) {
        self.send(EngineCmd::Seek(fraction));
    }

    fn position(&self) -> f32 {
        let st = lock(&self.state);
        if st.duration.is_zero() {
            return 0.0;
        }
        (st.elapsed.as_secs_f32() / st.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    fn time_millis(&self) -> u64 {
        lock(&self.state).elapsed.as_millis() as u64
    }

    fn duration_millis(&self) -> u64 {
        lock(&self.state).duration.as_millis() as u64
    }

    fn volume(&self) -> u8 {
        lock(&self.state).volume
    }

    fn set_volume(&self, volume: u8) {
        // Reflect immediately so a read right after a write sees it.
        lock(&self.state).volume = volume.min(100);
        self.send(EngineCmd::Volume(volume));
    }

    fn set_repeat(&self, repeat: bool) {
        lock(&self.state).repeat = repeat;
    }

    fn current_handle(&self) -> Option<MediaHandle> {
        lock(&self.state).current
    }

    fn is_playing(&self) -> bool {
        lock(&self.state).playing
    }

    fn will_accept_new_target(&self) -> bool {
        self.pending.load(Ordering::SeqCst) == 0
    }

    /// Sinks are opened from local files only.
    fn plays_streams(&self) -> bool {
        false
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        self.quit();
    }
}
