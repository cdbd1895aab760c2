//! Utilities for creating `rodio` sinks from file locators.
//!
//! The helper here encapsulates opening/decoding a file and preparing a
//! paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::{Error, Result};

/// Create a paused `Sink` for `locator` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    handle: &OutputStream,
    locator: &str,
    start_at: Duration,
    volume: f32,
) -> Result<Sink> {
    let file = File::open(locator)
        .map_err(|e| Error::Engine(format!("failed to open {locator}: {e}")))?;

    let source = Decoder::new(BufReader::new(file))
        .map_err(|e| Error::Engine(format!("failed to decode {locator}: {e}")))?
        // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
        .skip_duration(start_at);

    let sink = Sink::connect_new(handle.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    Ok(sink)
}
