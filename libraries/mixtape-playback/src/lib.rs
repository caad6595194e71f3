//! Mixtape - Playback Control
//!
//! Platform-agnostic playback control for a list of audio tracks sharing a
//! single media resource.
//!
//! This crate provides:
//! - Play / pause / select / advance over an ordered track list
//! - "Play all" sequential mode
//! - Volume relay between a `0..=100` slider and a `0.0..=1.0` resource
//! - A one-time startup probe that measures every track's duration
//! - "m:ss" time formatting for track clocks
//!
//! # Architecture
//!
//! `mixtape-playback` has no audio or UI dependencies. The media resource
//! and every display element are supplied through traits
//! ([`MediaResource`], [`TrackDisplay`], [`ControlPanel`]), and all input
//! arrives as [`UserCommand`]s and [`MediaEvent`]s on a single thread.
//!
//! # Example
//!
//! ```rust
//! use mixtape_playback::{
//!     MediaEvent, MediaResource, PlayAllControl, PlaybackController, PlayerStatus,
//!     TotalTimeDisplay, TrackDisplay, UserCommand, VolumeControl,
//! };
//!
//! #[derive(Default)]
//! struct Audio {
//!     source: Option<String>,
//!     volume: f32,
//! }
//!
//! impl MediaResource for Audio {
//!     fn set_source(&mut self, locator: Option<&str>) {
//!         self.source = locator.map(str::to_string);
//!     }
//!     fn source(&self) -> Option<&str> {
//!         self.source.as_deref()
//!     }
//!     fn play(&mut self) {}
//!     fn pause(&mut self) {}
//!     fn volume(&self) -> f32 {
//!         self.volume
//!     }
//!     fn set_volume(&mut self, volume: f32) {
//!         self.volume = volume;
//!     }
//!     fn current_time(&self) -> f64 {
//!         0.0
//!     }
//! }
//!
//! struct Row(String);
//!
//! impl TrackDisplay for Row {
//!     fn locator(&self) -> &str {
//!         &self.0
//!     }
//!     fn set_selected(&mut self, _selected: bool) {}
//!     fn set_current_time(&mut self, _display: &str) {}
//!     fn set_total_time(&mut self, display: &str) {
//!         println!("{}: {}", self.0, display);
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Controls(u8);
//!
//! impl PlayAllControl for Controls {
//!     fn set_selected(&mut self, _selected: bool) {}
//! }
//! impl VolumeControl for Controls {
//!     fn value(&self) -> u8 {
//!         self.0
//!     }
//!     fn set_value(&mut self, level: u8) {
//!         self.0 = level;
//!     }
//! }
//! impl TotalTimeDisplay for Controls {
//!     fn set_text(&mut self, _display: &str) {}
//! }
//!
//! let rows = vec![Row("EBS_Test.mp3".into()), Row("Press_One.mp3".into())];
//! let mut player = PlaybackController::new(Audio::default(), rows, Controls::default());
//!
//! // Measure durations; the resource reports each one back
//! player.start();
//! player.handle_media_event(MediaEvent::MetadataReady { duration: 42.0 });
//! player.handle_media_event(MediaEvent::MetadataReady { duration: 17.0 });
//!
//! player.handle_command(UserCommand::SelectTrack(1)).ok();
//! assert_eq!(player.status(), PlayerStatus::Playing { index: 1 });
//! ```

mod controller;
mod display;
mod error;
mod events;
mod format;
mod media;
mod probe;
pub mod types;
pub mod volume;

// Public exports
pub use controller::PlaybackController;
pub use display::{ControlPanel, PlayAllControl, TotalTimeDisplay, TrackDisplay, VolumeControl};
pub use error::{PlaybackError, Result};
pub use events::{MediaEvent, UserCommand};
pub use format::format_time;
pub use media::MediaResource;
pub use probe::{DurationProbe, ProbeStatus};
pub use types::{PlaybackState, PlayerStatus, TrackRef};
