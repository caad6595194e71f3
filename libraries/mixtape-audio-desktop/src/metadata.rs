//! Metadata-only media resource
//!
//! Answers duration queries straight from the container without opening an
//! audio device. Used for headless listings and for hosts that need track
//! lengths before (or instead of) playback.

use std::path::PathBuf;

use crossbeam_channel::{unbounded, Receiver, Sender};
use mixtape_playback::{MediaEvent, MediaResource};
use tracing::{debug, error};

use crate::sources::probe_duration;

/// Media resource that reports metadata and never produces sound
///
/// `set_source` probes the file synchronously and queues
/// [`MediaEvent::MetadataReady`]; playback requests only flip a flag.
pub struct MetadataResource {
    base_dir: PathBuf,
    source: Option<String>,
    volume: f32,
    playing: bool,
    event_tx: Sender<MediaEvent>,
    event_rx: Receiver<MediaEvent>,
}

impl MetadataResource {
    /// Create a resource resolving locators against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let (event_tx, event_rx) = unbounded();

        Self {
            base_dir: base_dir.into(),
            source: None,
            volume: 1.0,
            playing: false,
            event_tx,
            event_rx,
        }
    }

    /// Receiver for queued notifications
    pub fn events(&self) -> Receiver<MediaEvent> {
        self.event_rx.clone()
    }

    /// Whether playback was requested
    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl MediaResource for MetadataResource {
    fn set_source(&mut self, locator: Option<&str>) {
        self.source = locator.map(str::to_owned);
        self.playing = false;

        let Some(locator) = locator else {
            return;
        };

        let path = self.base_dir.join(locator);
        match probe_duration(&path) {
            Ok(duration) => {
                debug!(locator, duration, "Metadata ready");
                let _ = self.event_tx.send(MediaEvent::MetadataReady { duration });
            }
            Err(e) => error!(path = %path.display(), error = %e, "Failed to read metadata"),
        }
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn current_time(&self) -> f64 {
        0.0
    }
}
