//! Library access: locator expansion, random sampling and tag reading.

mod metadata;
mod scan;

pub use metadata::{MetadataWorker, TrackMetadata, placeholder_title, read_metadata};
pub use scan::{expand_all, is_stream, sample_candidates};
