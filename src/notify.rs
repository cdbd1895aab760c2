//! Normalized messages for observers and the sinks that deliver them.

mod message;
mod sink;

pub use message::{Notification, PlaybackStatus, PlayerState};
#[cfg(test)]
pub use sink::ChannelSink;
pub use sink::{Broadcaster, JsonLinesSink, NotificationSink};

#[cfg(test)]
mod tests;
