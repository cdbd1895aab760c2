//! Tracklist store: the ordered records the controller plays from.

mod model;

pub use model::{Removal, Retarget, TrackRecord, Tracklist};
