//! In-memory engine for controller tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::error::{Error, Result};

use super::types::{MediaHandle, PlaybackEngine};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    PlayAt(usize),
    SetTarget(Option<usize>),
    Resume,
    SetPause(bool),
    SetPosition(f32),
    SetVolume(u8),
    SetRepeat(bool),
    RemoveAt(usize),
}

#[derive(Default)]
struct FakeState {
    entries: Vec<(MediaHandle, String)>,
    current: Option<MediaHandle>,
    playing: bool,
    volume: u8,
    position: f32,
    repeat: bool,
    calls: Vec<Call>,
}

pub struct FakeEngine {
    state: Mutex<FakeState>,
    ready: AtomicBool,
    streams: AtomicBool,
    next_handle: AtomicU64,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                volume: 100,
                ..FakeState::default()
            }),
            ready: AtomicBool::new(true),
            streams: AtomicBool::new(true),
            next_handle: AtomicU64::new(1),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn set_plays_streams(&self, streams: bool) {
        self.streams.store(streams, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn locators(&self) -> Vec<String> {
        let st = self.state.lock().unwrap();
        st.entries.iter().map(|(_, l)| l.clone()).collect()
    }

    pub fn current_index(&self) -> Option<usize> {
        let st = self.state.lock().unwrap();
        let current = st.current?;
        st.entries.iter().position(|(h, _)| *h == current)
    }

    pub fn repeat(&self) -> bool {
        self.state.lock().unwrap().repeat
    }

    /// Simulate the engine pausing on its own (e.g. a device hiccup).
    pub fn force_playing(&self, playing: bool) {
        self.state.lock().unwrap().playing = playing;
    }

    fn target(&self, index: usize) -> Result<MediaHandle> {
        let st = self.state.lock().unwrap();
        st.entries
            .get(index)
            .map(|(h, _)| *h)
            .ok_or_else(|| Error::Validation(format!("no engine item at index {index}")))
    }
}

impl PlaybackEngine for FakeEngine {
    fn enqueue(&self, locator: &str) -> MediaHandle {
        let handle = MediaHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.state
            .lock()
            .unwrap()
            .entries
            .push((handle, locator.to_string()));
        handle
    }

    fn remove_at(&self, index: usize) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        if index >= st.entries.len() {
            return Err(Error::Validation(format!("no engine item at index {index}")));
        }
        st.entries.remove(index);
        st.calls.push(Call::RemoveAt(index));
        Ok(())
    }

    fn play_at(&self, index: usize) -> Result<()> {
        let handle = self.target(index)?;
        let mut st = self.state.lock().unwrap();
        st.current = Some(handle);
        st.playing = true;
        st.position = 0.0;
        st.calls.push(Call::PlayAt(index));
        Ok(())
    }

    fn set_target(&self, index: Option<usize>) -> Result<()> {
        let handle = match index {
            Some(i) => Some(self.target(i)?),
            None => None,
        };
        let mut st = self.state.lock().unwrap();
        st.current = handle;
        st.playing = false;
        st.position = 0.0;
        st.calls.push(Call::SetTarget(index));
        Ok(())
    }

    fn resume(&self) {
        let mut st = self.state.lock().unwrap();
        if st.current.is_some() {
            st.playing = true;
        }
        st.calls.push(Call::Resume);
    }

    fn set_pause(&self, paused: bool) {
        let mut st = self.state.lock().unwrap();
        if st.current.is_some() {
            st.playing = !paused;
        }
        st.calls.push(Call::SetPause(paused));
    }

    fn set_position(&self, fraction: f32) {
        let mut st = self.state.lock().unwrap();
        st.position = fraction;
        st.calls.push(Call::SetPosition(fraction));
    }

    fn position(&self) -> f32 {
        self.state.lock().unwrap().position
    }

    fn time_millis(&self) -> u64 {
        0
    }

    fn duration_millis(&self) -> u64 {
        0
    }

    fn volume(&self) -> u8 {
        self.state.lock().unwrap().volume
    }

    fn set_volume(&self, volume: u8) {
        let mut st = self.state.lock().unwrap();
        st.volume = volume.min(100);
        st.calls.push(Call::SetVolume(volume));
    }

    fn set_repeat(&self, repeat: bool) {
        let mut st = self.state.lock().unwrap();
        st.repeat = repeat;
        st.calls.push(Call::SetRepeat(repeat));
    }

    fn current_handle(&self) -> Option<MediaHandle> {
        self.state.lock().unwrap().current
    }

    fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    fn will_accept_new_target(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn plays_streams(&self) -> bool {
        self.streams.load(Ordering::SeqCst)
    }
}
