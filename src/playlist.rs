//! Flat-file playlists in extended M3U format.

mod m3u;

pub use m3u::{M3uEntry, PlaylistStore, parse_m3u};

#[cfg(test)]
mod tests;
