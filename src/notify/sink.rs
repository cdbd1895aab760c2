use std::io::Write;
use std::sync::Mutex;
#[cfg(test)]
use std::sync::mpsc::Sender;

use tracing::warn;

use super::message::Notification;

/// Receives normalized notifications. Sinks only read; they never call
/// back into the controller.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, note: &Notification);
}

/// Writes one JSON object per line, e.g. to stdout.
pub struct JsonLinesSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl<W: Write + Send> NotificationSink for JsonLinesSink<W> {
    fn notify(&self, note: &Notification) {
        let line = match serde_json::to_string(note) {
            Ok(l) => l,
            Err(e) => {
                warn!(error = %e, "cannot encode notification");
                return;
            }
        };
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            warn!(error = %e, "cannot write notification");
        }
    }
}

/// Forwards notifications into a channel.
#[cfg(test)]
pub struct ChannelSink {
    tx: Mutex<Sender<Notification>>,
}

#[cfg(test)]
impl ChannelSink {
    pub fn new(tx: Sender<Notification>) -> Self {
        Self { tx: Mutex::new(tx) }
    }
}

#[cfg(test)]
impl NotificationSink for ChannelSink {
    fn notify(&self, note: &Notification) {
        let tx = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        // A dropped receiver just means nobody is listening any more.
        let _ = tx.send(note.clone());
    }
}

/// Fan-out to several sinks (display, remote clients, ...).
#[derive(Default)]
pub struct Broadcaster {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl NotificationSink for Broadcaster {
    fn notify(&self, note: &Notification) {
        for sink in &self.sinks {
            sink.notify(note);
        }
    }
}
