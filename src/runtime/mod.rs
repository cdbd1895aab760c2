use std::env;
use std::io;
use std::sync::{Arc, mpsc};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingSettings;
use crate::controller::{Controller, ControllerParts};
use crate::engine::{PlaybackEngine, RodioEngine};
use crate::library::MetadataWorker;
use crate::mode::ModeEngine;
use crate::notify::{Broadcaster, JsonLinesSink};
use crate::playlist::PlaylistStore;

mod event_loop;
mod settings;
mod startup;

#[cfg(test)]
mod tests;

/// Logs go to stderr; stdout carries responses and notifications.
fn init_logging(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();
    init_logging(&settings.logging);
    if let Some(msg) = config_warning {
        warn!("{msg}");
    }

    let (events_tx, events_rx) = mpsc::channel();
    let audio = Arc::new(RodioEngine::new(events_tx.clone())?);
    let engine: Arc<dyn PlaybackEngine> = audio.clone();

    let volume = startup::select_volume_backend(&settings, engine.clone());
    let volume_kind = volume.kind();

    let playlists = settings.library.resolved_playlist_dir().map(PlaylistStore::new);
    match &playlists {
        Some(store) => info!(dir = %store.dir().display(), "playlist store"),
        None => warn!("no playlist directory; playlist commands are disabled"),
    }

    let ctrl = Controller::new(
        ControllerParts {
            engine,
            volume,
            sink: Arc::new(Broadcaster::new().with(JsonLinesSink::new(io::stdout()))),
            metadata: Some(MetadataWorker::spawn(events_tx)),
            playlists,
            modes: ModeEngine::new(),
        },
        &settings,
    );
    ctrl.spawn_event_loop(events_rx)?;
    let _mixer_poll = ctrl.spawn_mixer_poll();

    startup::apply_playback_defaults(&ctrl, volume_kind, &settings);
    if let Some(locator) = env::args().nth(1) {
        startup::play_initial(&ctrl, &locator);
    }

    info!("jukebox ready");
    let served = event_loop::serve(&ctrl, io::stdin().lock(), io::stdout());
    audio.quit();
    served?;
    Ok(())
}
