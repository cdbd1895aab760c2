//! Structural tracklist changes. Each public operation re-emits the
//! `current` + `tracklist` pair whether it succeeds or not.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::library::{expand_all, is_stream, sample_candidates};
use crate::playlist::M3uEntry;
use crate::tracklist::Retarget;

use super::player::{Controller, Core};
use super::switch::{PendingSwitch, SwitchTarget, Trigger};

/// What an add-style operation did.
#[derive(Debug)]
pub struct AddOutcome {
    pub added: usize,
    /// Locators that could not be expanded; the rest were still added.
    pub skipped: Vec<Error>,
    /// Set when the operation also started playback.
    pub pending: Option<PendingSwitch>,
}

impl Controller {
    /// Replace the whole tracklist with `locators` and start at index 0.
    pub fn new_tracklist(&self, locators: &[String]) -> Result<AddOutcome> {
        let result = self.replace_inner(locators);
        self.publish();
        result
    }

    fn replace_inner(&self, locators: &[String]) -> Result<AddOutcome> {
        let (found, skipped) = self.expand(locators)?;
        let (added, first) = {
            let mut core = self.lock();
            self.clear_locked(&mut core);
            let added = self.append_locked(&mut core, &found);
            (added, SwitchTarget::at(&core, 0))
        };
        info!(added, "new tracklist");
        let pending = self.start_switch(first?, 1, Trigger::Command)?;
        Ok(AddOutcome {
            added,
            skipped,
            pending: Some(pending),
        })
    }

    /// Append `locators` (files, directories, playlists or streams).
    pub fn add(&self, locators: &[String]) -> Result<AddOutcome> {
        let result = self.add_inner(locators);
        self.publish();
        result
    }

    fn add_inner(&self, locators: &[String]) -> Result<AddOutcome> {
        let (found, skipped) = self.expand(locators)?;
        let added = {
            let mut core = self.lock();
            self.append_locked(&mut core, &found)
        };
        Ok(AddOutcome {
            added,
            skipped,
            pending: None,
        })
    }

    /// Append `count` random playable files from below `root`.
    ///
    /// Fails without touching the tracklist when `root` holds nothing
    /// playable. With `clear_first` the old list is dropped and playback
    /// starts from the new first item.
    pub fn add_random_sample(&self, root: &Path, count: usize, clear_first: bool) -> Result<AddOutcome> {
        let result = self.sample_inner(root, count, clear_first);
        self.publish();
        result
    }

    fn sample_inner(&self, root: &Path, count: usize, clear_first: bool) -> Result<AddOutcome> {
        if count == 0 {
            return Err(Error::Validation("sample size must be at least 1".into()));
        }
        let mut candidates = sample_candidates(root, &self.inner.library)?;
        if candidates.is_empty() {
            return Err(Error::NotFound(format!(
                "no playable files under {}",
                root.display()
            )));
        }
        candidates.shuffle(&mut rand::rng());
        candidates.truncate(count);
        let picked: Vec<String> = candidates
            .into_iter()
            .map(|p: PathBuf| p.to_string_lossy().into_owned())
            .collect();

        let (added, first) = {
            let mut core = self.lock();
            if clear_first {
                self.clear_locked(&mut core);
            }
            let added = self.append_locked(&mut core, &picked);
            (added, SwitchTarget::at(&core, 0))
        };
        info!(added, root = %root.display(), "random sample");

        let pending = if clear_first {
            Some(self.start_switch(first?, 1, Trigger::Command)?)
        } else {
            None
        };
        Ok(AddOutcome {
            added,
            skipped: Vec::new(),
            pending,
        })
    }

    /// Remove several indices at once. Returns the removed indices.
    pub fn remove_indices(&self, indices: &BTreeSet<usize>) -> Result<Vec<usize>> {
        let result = self.remove_inner(indices);
        self.publish();
        result
    }

    /// Remove whatever is currently loaded.
    pub fn remove_current(&self) -> Result<Vec<usize>> {
        let current = {
            let core = self.lock();
            if core.tracklist.is_empty() {
                Err(Error::EmptyTracklist)
            } else {
                self.current_index(&core)
                    .ok_or_else(|| Error::NotFound("no current track".into()))
            }
        };
        match current {
            Ok(index) => self.remove_indices(&BTreeSet::from([index])),
            Err(e) => {
                self.publish();
                Err(e)
            }
        }
    }

    fn remove_inner(&self, indices: &BTreeSet<usize>) -> Result<Vec<usize>> {
        let mut core = self.lock();
        let current = self.current_index(&core);
        let engine = &self.inner.engine;
        let was_playing = engine.is_playing();

        let removal = core.tracklist.remove_indices(indices, current)?;

        match removal.retarget {
            // Same as clearing the list.
            Retarget::Clear => {
                engine.set_target(None)?;
                core.modes.reset_history();
                core.stopped = false;
                core.end_reached = false;
            }
            // Point the engine at the survivor before its old slot goes away.
            Retarget::To { before, after } => {
                debug!(before, after, "current track shifts");
                if was_playing {
                    engine.play_at(before)?;
                } else {
                    engine.set_target(Some(before))?;
                }
            }
            Retarget::Keep => {}
        }
        for &i in &removal.removed {
            if let Err(e) = engine.remove_at(i) {
                warn!(index = i, error = %e, "engine list out of step");
            }
        }
        Ok(removal.removed)
    }

    /// Drop every track and the shuffle history.
    pub fn clear(&self) {
        {
            let mut core = self.lock();
            self.clear_locked(&mut core);
        }
        self.publish();
    }

    pub(super) fn clear_locked(&self, core: &mut Core) {
        let engine = &self.inner.engine;
        if let Err(e) = engine.set_target(None) {
            warn!(error = %e, "cannot unload engine");
        }
        for i in (0..core.tracklist.len()).rev() {
            if let Err(e) = engine.remove_at(i) {
                warn!(index = i, error = %e, "engine list out of step");
            }
        }
        core.tracklist.clear();
        core.modes.reset_history();
        core.stopped = false;
        core.end_reached = false;
    }

    fn append_locked(&self, core: &mut Core, locators: &[String]) -> usize {
        for locator in locators {
            let handle = self.inner.engine.enqueue(locator);
            core.tracklist.push(handle, locator);
            if let Some(worker) = &self.inner.metadata {
                worker.request(handle, locator);
            }
        }
        core.end_reached = false;
        locators.len()
    }

    /// Expand locators; fails when nothing at all is playable.
    fn expand(&self, locators: &[String]) -> Result<(Vec<String>, Vec<Error>)> {
        if locators.is_empty() {
            return Err(Error::Validation("no locators given".into()));
        }
        let (mut found, mut skipped) = expand_all(locators, &self.inner.library);
        if !self.inner.engine.plays_streams() {
            found.retain(|locator| {
                if is_stream(locator) {
                    skipped.push(Error::Validation(format!(
                        "streams are not supported by this engine: {locator}"
                    )));
                    return false;
                }
                true
            });
        }
        if found.is_empty() {
            return Err(if skipped.is_empty() {
                Error::NotFound("nothing playable in the given locators".into())
            } else {
                skipped.remove(0)
            });
        }
        for e in &skipped {
            warn!(error = %e, "skipped locator");
        }
        Ok((found, skipped))
    }

    /// Write the tracklist to `<playlist dir>/<name>.m3u`.
    pub fn save_playlist(&self, name: &str) -> Result<PathBuf> {
        let store = self.playlist_store()?;
        let entries: Vec<M3uEntry> = {
            let core = self.lock();
            core.tracklist
                .records()
                .iter()
                .map(|r| M3uEntry {
                    locator: r.locator.clone(),
                    title: Some(r.title.clone()),
                    duration_secs: (r.duration_millis > 0).then(|| (r.duration_millis / 1000) as i64),
                })
                .collect()
        };
        let path = store.save(name, &entries)?;
        info!(path = %path.display(), "playlist saved");
        Ok(path)
    }

    pub fn rename_playlist(&self, old: &str, new: &str) -> Result<PathBuf> {
        self.playlist_store()?.rename(old, new)
    }

    pub fn delete_playlist(&self, name: &str) -> Result<()> {
        self.playlist_store()?.delete(name)
    }

    fn playlist_store(&self) -> Result<&crate::playlist::PlaylistStore> {
        self.inner
            .playlists
            .as_ref()
            .ok_or_else(|| Error::NotFound("no playlist directory configured".into()))
    }
}
