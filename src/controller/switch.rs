//! Moving to another item: mode lookup on the command path, then a
//! bounded wait for the engine on a separate thread.

use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::engine::MediaHandle;
use crate::error::{Error, Result};
use crate::mode::PlaybackMode;
use crate::notify::{Notification, PlayerState};

use super::player::{Controller, Core};

/// What asked for the switch. Only user commands toast on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Trigger {
    Command,
    EndOfTrack,
}

/// Where a switch is heading. The handle is what gets played; the index
/// is only what it was when the switch was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct SwitchTarget {
    pub index: usize,
    pub handle: MediaHandle,
}

impl SwitchTarget {
    pub(super) fn at(core: &Core, index: usize) -> Result<Self> {
        let record = core
            .tracklist
            .get(index)
            .ok_or_else(|| Error::NotFound(format!("no track at index {index}")))?;
        Ok(Self {
            index,
            handle: record.handle,
        })
    }
}

/// A switch running off the command path.
#[derive(Debug)]
#[must_use = "dropping a PendingSwitch detaches it; call wait() to observe the outcome"]
pub struct PendingSwitch {
    target: usize,
    handle: JoinHandle<Result<()>>,
}

impl PendingSwitch {
    /// Index the switch is heading for.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Block until the switch lands or is abandoned.
    pub fn wait(self) -> Result<()> {
        self.handle
            .join()
            .map_err(|_| Error::Engine("switch thread panicked".into()))?
    }
}

impl Controller {
    /// Move forward according to the playback mode.
    ///
    /// An engine timeout is retried once before the switch is abandoned.
    pub fn advance(&self) -> Result<PendingSwitch> {
        self.advance_from(Trigger::Command)
    }

    pub(super) fn advance_from(&self, trigger: Trigger) -> Result<PendingSwitch> {
        let target = {
            let mut core = self.lock();
            self.plan_advance(&mut core)?
        };
        self.start_switch(target, 1, trigger)
    }

    /// Pick the next item per mode and clear the stop flags.
    pub(super) fn plan_advance(&self, core: &mut Core) -> Result<SwitchTarget> {
        let count = core.tracklist.len();
        if count == 0 {
            return Err(Error::EmptyTracklist);
        }
        let index = match self.current_index(core) {
            Some(current) => core.modes.next(current, count)?,
            None if core.modes.mode() == PlaybackMode::Shuffle => core.modes.next(0, count)?,
            None => 0,
        };
        core.stopped = false;
        core.end_reached = false;
        SwitchTarget::at(core, index)
    }

    /// Move back according to the playback mode. Not retried.
    pub fn retreat(&self) -> Result<PendingSwitch> {
        let target = {
            let mut core = self.lock();
            let count = core.tracklist.len();
            if count == 0 {
                return Err(Error::EmptyTracklist);
            }
            let index = match self.current_index(&core) {
                Some(current) => core.modes.previous(current, count)?,
                None if core.modes.mode() == PlaybackMode::Shuffle => {
                    core.modes.previous(0, count)?
                }
                None => count - 1,
            };
            core.stopped = false;
            core.end_reached = false;
            SwitchTarget::at(&core, index)?
        };
        self.start_switch(target, 0, Trigger::Command)
    }

    pub(super) fn start_switch(
        &self,
        target: SwitchTarget,
        retries: u32,
        trigger: Trigger,
    ) -> Result<PendingSwitch> {
        self.notify(Notification::Current(PlayerState::loading()));

        let ctrl = self.clone();
        let handle = thread::Builder::new()
            .name("switch".into())
            .spawn(move || {
                let result = ctrl.switch_to(target, retries);
                if let Err(e) = &result {
                    warn!(target = target.index, error = %e, ?trigger, "switch abandoned");
                    if trigger == Trigger::Command {
                        ctrl.toast(format!("Could not change track: {e}"));
                    }
                }
                ctrl.publish_current();
                result
            })?;
        Ok(PendingSwitch {
            target: target.index,
            handle,
        })
    }

    fn switch_to(&self, target: SwitchTarget, retries: u32) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.wait_until_ready() {
                Ok(()) => break,
                Err(e @ Error::EngineTimeout { .. }) if attempt >= retries => return Err(e),
                Err(Error::EngineTimeout { .. }) => {
                    attempt += 1;
                    debug!(target = target.index, attempt, "engine busy, retrying switch");
                }
                Err(e) => return Err(e),
            }
        }

        // Removals while we waited may have shifted the target.
        let core = self.lock();
        let index = core
            .tracklist
            .index_of(target.handle)
            .ok_or_else(|| Error::NotFound("track was removed before it could play".into()))?;
        if index != target.index {
            debug!(from = target.index, to = index, "switch target moved");
        }
        self.inner.engine.play_at(index)
    }

    /// Bounded poll of the engine's ready predicate.
    fn wait_until_ready(&self) -> Result<()> {
        let attempts = self.inner.ready_attempts;
        for _ in 0..attempts {
            if self.inner.engine.will_accept_new_target() {
                return Ok(());
            }
            thread::sleep(self.inner.ready_interval);
        }
        Err(Error::EngineTimeout { attempts })
    }
}
