use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, SyncSender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::library::read_metadata;

use super::sink::create_sink_at;
use super::types::{EngineEvent, MediaHandle};

const TICK: Duration = Duration::from_millis(200);

pub(super) struct Entry {
    pub handle: MediaHandle,
    pub locator: String,
}

/// State shared between the engine handle and the audio thread.
#[derive(Default)]
pub(super) struct EngineState {
    pub entries: Vec<Entry>,
    pub current: Option<MediaHandle>,
    pub playing: bool,
    pub elapsed: Duration,
    pub duration: Duration,
    pub volume: u8,
    pub repeat: bool,
}

pub(super) type StateHandle = Arc<Mutex<EngineState>>;

pub(super) fn lock(state: &StateHandle) -> MutexGuard<'_, EngineState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug)]
pub(super) enum EngineCmd {
    /// Replace the loaded item; counts against the pending-target counter.
    Load {
        handle: MediaHandle,
        locator: String,
        play: bool,
    },
    /// Drop the loaded item; counts against the pending-target counter.
    Unload,
    Resume,
    Pause,
    Seek(f32),
    Volume(u8),
    Quit,
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<EngineCmd>,
    state: StateHandle,
    pending: Arc<AtomicUsize>,
    events: Sender<EngineEvent>,
    ready: SyncSender<Result<()>>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new().name("audio".into()).spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(Error::Engine(format!("no audio output device: {e}"))));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped; stdout/stderr belong to the protocol and tracing.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let mut deck = Deck {
            stream: &stream,
            state,
            pending,
            events,
            sink: None,
            locator: None,
            started_at: None,
            accumulated: Duration::ZERO,
        };

        loop {
            match rx.recv_timeout(TICK) {
                Ok(EngineCmd::Quit) | Err(RecvTimeoutError::Disconnected) => {
                    deck.unload(false);
                    break;
                }
                Ok(cmd) => deck.apply(cmd),
                Err(RecvTimeoutError::Timeout) => deck.tick(),
            }
            deck.publish_elapsed();
        }
    })
}

/// Everything the audio thread owns about the loaded item.
struct Deck<'a> {
    stream: &'a OutputStream,
    state: StateHandle,
    pending: Arc<AtomicUsize>,
    events: Sender<EngineEvent>,
    sink: Option<Sink>,
    locator: Option<String>,
    // Start time of the current playing stretch; `None` while paused.
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl Deck<'_> {
    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }

    fn publish_elapsed(&self) {
        let elapsed = self.elapsed();
        lock(&self.state).elapsed = elapsed;
    }

    fn apply(&mut self, cmd: EngineCmd) {
        match cmd {
            EngineCmd::Load {
                handle,
                locator,
                play,
            } => {
                self.load(handle, locator, play);
                self.pending.fetch_sub(1, Ordering::SeqCst);
            }
            EngineCmd::Unload => {
                self.unload(true);
                self.pending.fetch_sub(1, Ordering::SeqCst);
            }
            EngineCmd::Resume => self.resume(),
            EngineCmd::Pause => self.pause(),
            EngineCmd::Seek(fraction) => self.seek(fraction),
            EngineCmd::Volume(v) => self.set_volume(v),
            EngineCmd::Quit => {}
        }
    }

    fn load(&mut self, handle: MediaHandle, locator: String, play: bool) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.started_at = None;
        self.accumulated = Duration::ZERO;

        let volume = f32::from(lock(&self.state).volume) / 100.0;
        let opened = create_sink_at(self.stream, &locator, Duration::ZERO, volume);
        let duration = Duration::from_millis(read_metadata(&locator).duration_millis);

        {
            let mut st = lock(&self.state);
            st.current = Some(handle);
            st.playing = false;
            st.elapsed = Duration::ZERO;
            st.duration = duration;
        }

        match opened {
            Ok(sink) => {
                debug!(%locator, "loaded");
                self.sink = Some(sink);
                self.locator = Some(locator);
                if play {
                    self.start();
                } else {
                    // Observers learn about a paused retarget only from this.
                    self.emit(EngineEvent::Paused);
                }
            }
            Err(e) => {
                warn!(error = %e, "cannot play item");
                self.locator = None;
                self.emit(EngineEvent::Stopped);
            }
        }
    }

    fn start(&mut self) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        sink.play();
        self.started_at = Some(Instant::now());
        lock(&self.state).playing = true;
        self.emit(EngineEvent::Started);
    }

    fn pause(&mut self) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        let Some(st) = self.started_at.take() else {
            return;
        };
        sink.pause();
        self.accumulated += st.elapsed();
        lock(&self.state).playing = false;
        self.emit(EngineEvent::Paused);
    }

    fn resume(&mut self) {
        if self.sink.is_some() {
            if self.started_at.is_none() {
                self.start();
            }
            return;
        }

        // Nothing loaded (ended or unplayable): reload the current target from the top.
        let target = {
            let st = lock(&self.state);
            st.current.and_then(|h| {
                st.entries
                    .iter()
                    .find(|e| e.handle == h)
                    .map(|e| (h, e.locator.clone()))
            })
        };
        if let Some((handle, locator)) = target {
            self.load(handle, locator, true);
        }
    }

    fn unload(&mut self, notify: bool) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.locator = None;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
        {
            let mut st = lock(&self.state);
            st.current = None;
            st.playing = false;
            st.elapsed = Duration::ZERO;
            st.duration = Duration::ZERO;
        }
        if notify {
            self.emit(EngineEvent::Stopped);
        }
    }

    fn seek(&mut self, fraction: f32) {
        // Scrubbing: rebuild the current sink and skip into the file.
        let (Some(old), Some(locator)) = (self.sink.as_ref(), self.locator.clone()) else {
            return;
        };
        let (duration, volume) = {
            let st = lock(&self.state);
            (st.duration, f32::from(st.volume) / 100.0)
        };
        let target = duration.mul_f32(fraction.clamp(0.0, 1.0));
        let was_playing = self.started_at.is_some();
        old.stop();

        match create_sink_at(self.stream, &locator, target, volume) {
            Ok(new_sink) => {
                if was_playing {
                    new_sink.play();
                    self.started_at = Some(Instant::now());
                } else {
                    self.started_at = None;
                }
                self.sink = Some(new_sink);
                self.accumulated = target;
            }
            Err(e) => {
                warn!(error = %e, "seek failed");
                self.sink = None;
                self.started_at = None;
                lock(&self.state).playing = false;
                self.emit(EngineEvent::Stopped);
            }
        }
    }

    fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(100);
        lock(&self.state).volume = volume;
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(f32::from(volume) / 100.0);
        }
        self.emit(EngineEvent::VolumeChanged(volume));
    }

    /// Periodic check for the end of the current item.
    fn tick(&mut self) {
        let finished = match self.sink.as_ref() {
            Some(s) => self.started_at.is_some() && s.empty(),
            None => false,
        };
        if !finished {
            return;
        }

        self.emit(EngineEvent::EndReached);

        let (repeat, current) = {
            let st = lock(&self.state);
            (st.repeat, st.current)
        };
        match (repeat, current, self.locator.clone()) {
            (true, Some(handle), Some(locator)) => self.load(handle, locator, true),
            _ => {
                // Keep the finished item as the current target so the
                // controller can tell which index just ended.
                self.sink = None;
                self.started_at = None;
                let mut st = lock(&self.state);
                self.accumulated = st.duration;
                st.playing = false;
            }
        }
    }
}
