use std::collections::BTreeSet;

use serde::Serialize;

use crate::engine::MediaHandle;
use crate::error::{Error, Result};
use crate::library::{TrackMetadata, placeholder_title};

/// One entry of the tracklist as observers see it.
///
/// Identity is `handle`; `index` is derived and rewritten on every
/// structural change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRecord {
    pub index: usize,
    pub locator: String,
    pub artist: String,
    pub title: String,
    pub duration_millis: u64,
    #[serde(skip)]
    pub handle: MediaHandle,
    #[serde(skip)]
    pub resolved: bool,
}

/// Where the engine has to point after a removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retarget {
    /// The current item survives; handles keep the engine valid.
    Keep,
    /// The current item was removed. `before` is the surviving target's
    /// index prior to removal, `after` its index once removal completes.
    To { before: usize, after: usize },
    /// Nothing survives.
    Clear,
}

#[derive(Debug)]
pub struct Removal {
    /// Removed indices, highest first, as they were before removal.
    pub removed: Vec<usize>,
    pub retarget: Retarget,
}

#[derive(Debug, Default)]
pub struct Tracklist {
    records: Vec<TrackRecord>,
}

impl Tracklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrackRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[TrackRecord] {
        &self.records
    }

    pub fn index_of(&self, handle: MediaHandle) -> Option<usize> {
        self.records.iter().position(|r| r.handle == handle)
    }

    /// Append a record with placeholder metadata and return its index.
    pub fn push(&mut self, handle: MediaHandle, locator: &str) -> usize {
        let index = self.records.len();
        self.records.push(TrackRecord {
            index,
            locator: locator.to_string(),
            artist: String::new(),
            title: placeholder_title(locator),
            duration_millis: 0,
            handle,
            resolved: false,
        });
        index
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Remove every index in `indices` as one step.
    ///
    /// All indices are checked before anything changes. Removing the only
    /// record, or every record, clears the list.
    pub fn remove_indices(
        &mut self,
        indices: &BTreeSet<usize>,
        current: Option<usize>,
    ) -> Result<Removal> {
        if indices.is_empty() {
            return Err(Error::Validation("no indices given".into()));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.records.len()) {
            return Err(Error::NotFound(format!("no track at index {bad}")));
        }

        let removed: Vec<usize> = indices.iter().rev().copied().collect();

        if indices.len() == self.records.len() {
            self.records.clear();
            return Ok(Removal {
                removed,
                retarget: Retarget::Clear,
            });
        }

        let retarget = match current {
            Some(cur) if indices.contains(&cur) => {
                let survivor = (cur + 1..self.records.len())
                    .find(|i| !indices.contains(i))
                    .or_else(|| (0..self.records.len()).find(|i| !indices.contains(i)));
                match survivor {
                    Some(before) => Retarget::To {
                        before,
                        after: before - indices.range(..before).count(),
                    },
                    None => Retarget::Clear,
                }
            }
            _ => Retarget::Keep,
        };

        for &i in &removed {
            self.records.remove(i);
        }
        self.reindex_all();

        Ok(Removal { removed, retarget })
    }

    /// Restore `records[i].index == i` and refresh placeholder titles for
    /// records whose tags have not arrived yet. Idempotent.
    pub fn reindex_all(&mut self) {
        for (i, rec) in self.records.iter_mut().enumerate() {
            rec.index = i;
            if !rec.resolved {
                rec.title = placeholder_title(&rec.locator);
            }
        }
    }

    /// Patch the record for `handle` in place.
    ///
    /// Returns `None` when the handle is no longer in the list, otherwise
    /// whether every record is now resolved.
    pub fn apply_metadata(&mut self, handle: MediaHandle, meta: &TrackMetadata) -> Option<bool> {
        let rec = self.records.iter_mut().find(|r| r.handle == handle)?;
        rec.title = meta.title.clone();
        rec.artist = meta.artist.clone();
        rec.duration_millis = meta.duration_millis;
        rec.resolved = true;
        Some(self.records.iter().all(|r| r.resolved))
    }

    /// Position indicator for the display, e.g. "3/8". Empty when idle.
    pub fn position_summary(&self, current: Option<usize>) -> String {
        match current {
            Some(i) if i < self.records.len() => format!("{}/{}", i + 1, self.records.len()),
            _ => String::new(),
        }
    }
}
