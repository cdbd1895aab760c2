//! Player controller: the only component that drives the engine.
//!
//! Tracklist, mode and shuffle history live behind one lock. Engine calls
//! that change the engine's item list are made under that lock so both
//! lists stay aligned; notifications are always sent after it is released.

mod events;
mod player;
mod queue;
mod switch;

pub use player::{Controller, ControllerParts, SeekReport};
pub use queue::AddOutcome;
pub use switch::PendingSwitch;
