use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::ItemKey;
use tracing::{debug, warn};

use crate::engine::{EngineEvent, MediaHandle};

use super::scan::is_stream;

/// Tag data for one track once it has been read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub duration_millis: u64,
}

/// Title shown before tags are known: the file stem, or the whole locator for streams.
pub fn placeholder_title(locator: &str) -> String {
    if is_stream(locator) {
        return locator.to_string();
    }
    Path::new(locator)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("UNKNOWN")
        .to_string()
}

/// Read title/artist/duration from `locator`, falling back to the placeholder
/// for anything that is missing or unreadable.
pub fn read_metadata(locator: &str) -> TrackMetadata {
    let mut meta = TrackMetadata {
        title: placeholder_title(locator),
        ..TrackMetadata::default()
    };
    if is_stream(locator) {
        return meta;
    }

    let tagged = match lofty::read_from_path(locator) {
        Ok(t) => t,
        Err(e) => {
            debug!(%locator, error = %e, "no readable tags");
            return meta;
        }
    };

    meta.duration_millis = tagged.properties().duration().as_millis() as u64;

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        if let Some(v) = tag.get_string(ItemKey::TrackTitle) {
            if !v.trim().is_empty() {
                meta.title = v.trim().to_string();
            }
        }
        if let Some(v) = tag.get_string(ItemKey::TrackArtist) {
            meta.artist = v.trim().to_string();
        }
    }
    meta
}

struct MetadataJob {
    handle: MediaHandle,
    locator: String,
}

/// Background reader that resolves tags off the command path and reports
/// each result as a `MetadataReady` event.
pub struct MetadataWorker {
    tx: Sender<MetadataJob>,
}

impl MetadataWorker {
    pub fn spawn(events: Sender<EngineEvent>) -> Self {
        let (tx, rx) = mpsc::channel::<MetadataJob>();
        if let Err(e) = thread::Builder::new()
            .name("metadata".into())
            .spawn(move || run_worker(rx, events))
        {
            warn!(error = %e, "failed to start metadata worker");
        }
        Self { tx }
    }

    /// Queue `locator` for resolution. Fire-and-forget.
    pub fn request(&self, handle: MediaHandle, locator: &str) {
        let job = MetadataJob {
            handle,
            locator: locator.to_string(),
        };
        if self.tx.send(job).is_err() {
            warn!(%locator, "metadata worker is gone");
        }
    }
}

fn run_worker(rx: Receiver<MetadataJob>, events: Sender<EngineEvent>) {
    for job in rx {
        let metadata = read_metadata(&job.locator);
        let event = EngineEvent::MetadataReady {
            handle: job.handle,
            metadata,
        };
        if events.send(event).is_err() {
            break;
        }
    }
}
