//! Error type shared by every layer of the jukebox.
//!
//! All variants are recoverable: the command boundary turns them into a
//! response payload and the event thread logs them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed command payload; rejected before any state is touched.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The operation needs at least one track.
    #[error("empty tracklist")]
    EmptyTracklist,

    /// The engine never reported it would accept a new target.
    #[error("playback engine not ready after {attempts} checks")]
    EngineTimeout { attempts: u32 },

    /// File, directory, playlist or index does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Playlist file write/rename/delete failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine refused a command.
    #[error("playback engine error: {0}")]
    Engine(String),

    /// The host mixer could not be queried or changed.
    #[error("mixer error: {0}")]
    Mixer(String),
}

pub type Result<T> = std::result::Result<T, Error>;
