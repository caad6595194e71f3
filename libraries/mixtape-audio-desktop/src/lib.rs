//! Desktop media resource implementation using CPAL
//!
//! This crate provides [`DesktopMediaResource`], the `MediaResource` used by
//! the Mixtape playback controller on desktop platforms.
//!
//! # Features
//!
//! - Cross-platform audio output using CPAL
//! - Streaming decode of local files with Symphonia
//! - Automatic sample rate conversion (rubato)
//! - Metadata, progress and end-of-track notifications over a channel
//!
//! # Example
//!
//! ```no_run
//! use mixtape_audio_desktop::{DesktopConfig, DesktopMediaResource};
//! use mixtape_playback::{MediaEvent, MediaResource};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut media = DesktopMediaResource::new(DesktopConfig::default())?;
//! let events = media.events();
//!
//! media.set_source(Some("sample.mp3"));
//! if let Ok(tagged) = events.recv() {
//!     // Notifications from a replaced source come back as None
//!     if let Some(MediaEvent::MetadataReady { duration }) = media.accept(tagged) {
//!         println!("{duration:.1}s");
//!     }
//! }
//!
//! media.set_volume(0.5);
//! media.play();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod metadata;
mod output;
pub mod sources;

pub use error::{AudioError, Result};
pub use metadata::MetadataResource;
pub use output::{DesktopConfig, DesktopMediaResource, SourceEvent, DEFAULT_TIME_UPDATE_INTERVAL};
pub use sources::{probe_duration, LocalSource};
