use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::ModeSetting;
use crate::error::{Error, Result};

/// Upper bound on remembered shuffle picks (and on draws per pick).
pub const SHUFFLE_HISTORY_CAP: usize = 10;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    #[default]
    Sequential,
    Loop,
    Shuffle,
}

impl PlaybackMode {
    /// Shuffle -> Loop -> Sequential -> Shuffle.
    pub fn cycled(self) -> Self {
        match self {
            Self::Shuffle => Self::Loop,
            Self::Loop => Self::Sequential,
            Self::Sequential => Self::Shuffle,
        }
    }
}

impl From<ModeSetting> for PlaybackMode {
    fn from(s: ModeSetting) -> Self {
        match s {
            ModeSetting::Sequential => Self::Sequential,
            ModeSetting::Loop => Self::Loop,
            ModeSetting::Shuffle => Self::Shuffle,
        }
    }
}

/// Mode state machine plus the shuffle history it owns.
///
/// History front is the most recent pick.
#[derive(Debug)]
pub struct ModeEngine {
    mode: PlaybackMode,
    history: VecDeque<usize>,
    rng: StdRng,
}

impl Default for ModeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeEngine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic draws.
    #[cfg(test)]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            mode: PlaybackMode::Sequential,
            history: VecDeque::with_capacity(SHUFFLE_HISTORY_CAP),
            rng,
        }
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    #[cfg(test)]
    pub fn history(&self) -> &VecDeque<usize> {
        &self.history
    }

    pub fn set_mode(&mut self, mode: PlaybackMode) {
        self.mode = mode;
        self.history.clear();
    }

    /// Advance the cycle by one and return the new mode.
    pub fn toggle(&mut self) -> PlaybackMode {
        self.set_mode(self.mode.cycled());
        self.mode
    }

    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    pub fn next(&mut self, current: usize, count: usize) -> Result<usize> {
        if count == 0 {
            return Err(Error::EmptyTracklist);
        }
        Ok(match self.mode {
            PlaybackMode::Sequential => (current + 1) % count,
            PlaybackMode::Loop => current,
            PlaybackMode::Shuffle => self.draw(count),
        })
    }

    pub fn previous(&mut self, current: usize, count: usize) -> Result<usize> {
        if count == 0 {
            return Err(Error::EmptyTracklist);
        }
        Ok(match self.mode {
            PlaybackMode::Sequential => (current % count + count - 1) % count,
            PlaybackMode::Loop => current,
            PlaybackMode::Shuffle => {
                if self.history.len() > 1 {
                    self.history.pop_front();
                    match self.history.front() {
                        Some(&i) if i < count => i,
                        _ => self.draw(count),
                    }
                } else {
                    // Nothing earlier to rewind to: draw forward.
                    self.history.clear();
                    self.draw(count)
                }
            }
        })
    }

    fn draw(&mut self, count: usize) -> usize {
        let cap = SHUFFLE_HISTORY_CAP.min(count);
        while self.history.len() >= cap {
            self.history.pop_back();
        }

        let mut pick = self.rng.random_range(0..count);
        for _ in 1..SHUFFLE_HISTORY_CAP {
            if !self.history.contains(&pick) {
                break;
            }
            pick = self.rng.random_range(0..count);
        }

        self.history.push_front(pick);
        pick
    }
}
