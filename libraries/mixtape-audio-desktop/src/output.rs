/// CPAL-backed media resource (dedicated audio thread + background loader)
use crate::error::{AudioError, Result};
use crate::sources::LocalSource;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use mixtape_playback::{MediaEvent, MediaResource};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default interval between `TimeAdvanced` notifications
pub const DEFAULT_TIME_UPDATE_INTERVAL: Duration = Duration::from_millis(250);

/// Desktop media resource configuration
#[derive(Debug, Clone)]
pub struct DesktopConfig {
    /// Directory that track locators are resolved against
    pub base_dir: PathBuf,
    /// How often playback progress is reported while audio is flowing
    pub time_update_interval: Duration,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            time_update_interval: DEFAULT_TIME_UPDATE_INTERVAL,
        }
    }
}

/// Media notification tagged with the source it belongs to
///
/// Events still queued when the source changes carry an old generation and
/// are dropped by [`DesktopMediaResource::accept`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceEvent {
    /// Source generation at the time the event was raised
    pub generation: u64,
    /// The notification itself
    pub event: MediaEvent,
}

/// State shared between the owner, loader threads and the audio callback
struct SharedState {
    /// Decoder for the current source (None while loading or unloaded)
    source: Mutex<Option<LocalSource>>,
    /// Bumped on every source change so stale loads are discarded
    generation: AtomicU64,
    /// Playback requested
    playing: AtomicBool,
    /// Current source played to the end
    ended: AtomicBool,
    /// Output gain (f32 bits)
    volume: AtomicU32,
    /// Frames rendered from the current source
    frames_played: AtomicU64,
}

impl SharedState {
    fn new() -> Self {
        Self {
            source: Mutex::new(None),
            generation: AtomicU64::new(0),
            playing: AtomicBool::new(false),
            ended: AtomicBool::new(false),
            volume: AtomicU32::new(1.0f32.to_bits()),
            frames_played: AtomicU64::new(0),
        }
    }

    fn source(&self) -> MutexGuard<'_, Option<LocalSource>> {
        self.source.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    /// Unload the current source and start a new generation
    fn reset_source(&self) -> u64 {
        let mut slot = self.source();
        *slot = None;
        self.playing.store(false, Ordering::Relaxed);
        self.ended.store(false, Ordering::Relaxed);
        self.frames_played.store(0, Ordering::Relaxed);
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The event, if it was raised for the current source
    fn current(&self, tagged: SourceEvent) -> Option<MediaEvent> {
        (tagged.generation == self.generation.load(Ordering::SeqCst)).then_some(tagged.event)
    }
}

/// Per-stream render state owned by the audio callback
struct Renderer {
    shared: Arc<SharedState>,
    events: Sender<SourceEvent>,
    channels: usize,
    tick_frames: u64,
    frames_since_tick: u64,
    scratch: Vec<f32>,
}

impl Renderer {
    /// Audio callback body (runs in the real-time audio thread)
    fn render(&mut self, output: &mut [f32]) {
        if !self.shared.playing.load(Ordering::Relaxed) {
            output.fill(0.0);
            return;
        }

        // Never block the audio thread on a loader
        let Ok(mut slot) = self.shared.source.try_lock() else {
            output.fill(0.0);
            return;
        };
        let Some(source) = slot.as_mut() else {
            output.fill(0.0);
            return;
        };
        // Stable while the slot is held: set_source bumps it under the lock
        let generation = self.shared.generation.load(Ordering::SeqCst);

        let frames = output.len() / self.channels;
        self.scratch.resize(frames * crate::sources::local::STEREO, 0.0);

        let read = match source.read(&mut self.scratch) {
            Ok(read) => read,
            Err(e) => {
                error!(error = %e, "Decoding failed, ending track");
                0
            }
        };
        let finished = read < self.scratch.len();
        drop(slot);

        let rendered = map_channels(
            &self.scratch[..read],
            output,
            self.channels,
            self.shared.volume(),
        );
        output[rendered * self.channels..].fill(0.0);

        let rendered = rendered as u64;
        self.shared.frames_played.fetch_add(rendered, Ordering::Relaxed);
        self.frames_since_tick += rendered;
        if self.frames_since_tick >= self.tick_frames {
            self.frames_since_tick = 0;
            // Progress ticks are droppable when the host falls behind
            let _ = self.events.try_send(SourceEvent {
                generation,
                event: MediaEvent::TimeAdvanced,
            });
        }

        if finished {
            self.shared.playing.store(false, Ordering::Relaxed);
            self.shared.ended.store(true, Ordering::Relaxed);
            self.frames_since_tick = 0;
            let _ = self.events.send(SourceEvent {
                generation,
                event: MediaEvent::PlaybackEnded,
            });
        }
    }
}

/// Desktop media resource
///
/// Implements [`MediaResource`] on top of CPAL and Symphonia. Notifications
/// arrive on the channel returned by [`events`](Self::events), pass through
/// [`accept`](Self::accept) and are then fed back into the controller by the
/// host.
///
/// **Architecture**: a dedicated audio thread owns the CPAL Stream (which is
/// not `Send` on every platform). Source changes decode metadata on a short
/// loader thread so the caller never blocks on file IO.
pub struct DesktopMediaResource {
    config: DesktopConfig,
    /// Locator of the loaded source
    source: Option<String>,
    /// Sample rate of the output device
    sample_rate: u32,
    shared: Arc<SharedState>,
    event_tx: Sender<SourceEvent>,
    event_rx: Receiver<SourceEvent>,
    shutdown_tx: Sender<()>,
    _audio_thread: Option<JoinHandle<()>>,
}

impl DesktopMediaResource {
    /// Open the default output device
    ///
    /// # Errors
    /// Returns an error if no audio device is found or the stream cannot start
    pub fn new(config: DesktopConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::DeviceNotFound)?;

        let supported = device.default_output_config()?;
        let sample_rate = supported.sample_rate();
        let channels = usize::from(supported.channels()).max(1);
        let stream_config = supported.config();

        Self::with_device_and_config(config, device, stream_config, sample_rate, channels)
    }

    fn with_device_and_config(
        config: DesktopConfig,
        device: Device,
        stream_config: StreamConfig,
        sample_rate: u32,
        channels: usize,
    ) -> Result<Self> {
        let shared = Arc::new(SharedState::new());
        let (event_tx, event_rx) = unbounded::<SourceEvent>();
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);

        let renderer = Renderer {
            shared: Arc::clone(&shared),
            events: event_tx.clone(),
            channels,
            tick_frames: tick_frames(sample_rate, config.time_update_interval),
            frames_since_tick: 0,
            scratch: Vec::new(),
        };

        let audio_thread = thread::Builder::new()
            .name("mixtape-audio".into())
            .spawn(move || {
                Self::audio_thread_run(device, stream_config, renderer, ready_tx, shutdown_rx);
            })
            .map_err(|e| AudioError::DeviceError(e.to_string()))?;

        ready_rx.recv().map_err(|_| AudioError::AudioThreadGone)??;

        info!(sample_rate, channels, "Audio output ready");

        Ok(Self {
            config,
            source: None,
            sample_rate,
            shared,
            event_tx,
            event_rx,
            shutdown_tx,
            _audio_thread: Some(audio_thread),
        })
    }

    /// Audio thread main loop
    ///
    /// Owns the CPAL Stream until shutdown is requested or the owner is
    /// dropped.
    fn audio_thread_run(
        device: Device,
        config: StreamConfig,
        mut renderer: Renderer,
        ready_tx: Sender<Result<()>>,
        shutdown_rx: Receiver<()>,
    ) {
        let stream = match Self::build_stream(&device, &config, move |data| renderer.render(data))
        {
            Ok(stream) => stream,
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return;
            }
        };

        let _ = ready_tx.send(Ok(()));

        // Returns on shutdown or when the sender is dropped
        let _ = shutdown_rx.recv();
        drop(stream);
        debug!("Audio thread stopped");
    }

    fn build_stream(
        device: &Device,
        config: &StreamConfig,
        mut render: impl FnMut(&mut [f32]) + Send + 'static,
    ) -> Result<Stream> {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| render(data),
            |err| error!(error = %err, "Audio stream error"),
            None,
        )?;

        stream.play()?;
        Ok(stream)
    }

    /// Receiver for media notifications
    pub fn events(&self) -> Receiver<SourceEvent> {
        self.event_rx.clone()
    }

    /// Unwrap a notification, or drop it if it belongs to a replaced source
    pub fn accept(&self, tagged: SourceEvent) -> Option<MediaEvent> {
        let event = self.shared.current(tagged);
        if event.is_none() {
            debug!(?tagged, "Dropping event from a replaced source");
        }
        event
    }

    /// Output device sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Resource configuration
    pub fn config(&self) -> &DesktopConfig {
        &self.config
    }

    /// Decode metadata for `locator` off-thread and install it as the source
    fn load(&self, locator: &str, generation: u64) {
        let path = self.config.base_dir.join(locator);
        let shared = Arc::clone(&self.shared);
        let events = self.event_tx.clone();
        let sample_rate = self.sample_rate;

        let spawned = thread::Builder::new()
            .name("mixtape-loader".into())
            .spawn(move || {
                let source = match LocalSource::open(&path, sample_rate) {
                    Ok(source) => source,
                    Err(e) => {
                        // No metadata event: anything waiting on it stalls
                        error!(path = %path.display(), error = %e, "Failed to load source");
                        return;
                    }
                };

                let duration = source.duration();
                {
                    let mut slot = shared.source();
                    if shared.generation.load(Ordering::SeqCst) != generation {
                        debug!(path = %path.display(), "Discarding superseded load");
                        return;
                    }
                    *slot = Some(source);
                }

                let _ = events.send(SourceEvent {
                    generation,
                    event: MediaEvent::MetadataReady { duration },
                });
            });

        if let Err(e) = spawned {
            error!(locator, error = %e, "Failed to spawn loader thread");
        }
    }
}

impl MediaResource for DesktopMediaResource {
    fn set_source(&mut self, locator: Option<&str>) {
        let generation = self.shared.reset_source();

        self.source = locator.map(str::to_owned);

        match locator {
            Some(locator) => {
                debug!(locator, "Loading source");
                self.load(locator, generation);
            }
            None => debug!("Source unloaded"),
        }
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn play(&mut self) {
        if self.shared.ended.swap(false, Ordering::Relaxed) {
            let mut slot = self.shared.source();
            if let Some(source) = slot.as_mut() {
                if let Err(e) = source.rewind() {
                    warn!(error = %e, "Failed to rewind source");
                }
            }
            self.shared.frames_played.store(0, Ordering::Relaxed);
        }

        self.shared.playing.store(true, Ordering::Relaxed);
    }

    fn pause(&mut self) {
        self.shared.playing.store(false, Ordering::Relaxed);
    }

    fn volume(&self) -> f32 {
        self.shared.volume()
    }

    fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.shared.volume.store(volume.to_bits(), Ordering::Relaxed);
    }

    fn current_time(&self) -> f64 {
        self.shared.frames_played.load(Ordering::Relaxed) as f64 / f64::from(self.sample_rate)
    }
}

impl Drop for DesktopMediaResource {
    fn drop(&mut self) {
        // Invalidate any in-flight load
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());
        // Audio thread will exit and join handle will be dropped
    }
}

/// Number of output frames between progress notifications
fn tick_frames(sample_rate: u32, interval: Duration) -> u64 {
    ((f64::from(sample_rate) * interval.as_secs_f64()).round() as u64).max(1)
}

/// Write interleaved stereo into an interleaved `channels`-wide buffer
///
/// Mono outputs get the average of both sides; extra channels stay silent.
/// Returns the number of frames written.
fn map_channels(stereo: &[f32], output: &mut [f32], channels: usize, gain: f32) -> usize {
    let mut frames = 0;

    for (src, dst) in stereo.chunks_exact(2).zip(output.chunks_exact_mut(channels)) {
        match dst {
            [mono] => *mono = (src[0] + src[1]) * 0.5 * gain,
            [left, right, rest @ ..] => {
                *left = src[0] * gain;
                *right = src[1] * gain;
                rest.fill(0.0);
            }
            [] => {}
        }
        frames += 1;
    }

    frames
}
