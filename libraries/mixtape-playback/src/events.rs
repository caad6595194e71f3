//! Events and commands fed into the playback controller
//!
//! Both kinds of input go through a single dispatch entry point each:
//! - [`MediaEvent`] via `PlaybackController::handle_media_event`
//! - [`UserCommand`] via `PlaybackController::handle_command`
//!
//! Hosts typically forward them from channels into one event loop, so the
//! controller only ever processes one input at a time.

use serde::{Deserialize, Serialize};

/// Notifications emitted by a media resource
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MediaEvent {
    /// Metadata of the loaded source is available
    MetadataReady {
        /// Total duration in seconds (may be non-finite for live streams)
        duration: f64,
    },

    /// Playback position moved forward
    TimeAdvanced,

    /// Playback reached the end of the source
    PlaybackEnded,
}

/// User interactions with the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserCommand {
    /// Track row clicked (toggle on the playing track, switch otherwise)
    SelectTrack(usize),

    /// "Play all" button clicked
    PlayAll,

    /// Stop whatever is playing
    Pause,

    /// Volume slider moved (`0..=100`)
    SetVolume(u8),
}

impl UserCommand {
    /// Whether this command loads or starts a source
    ///
    /// Such commands cannot run while the duration probe is using the
    /// media resource.
    pub fn needs_media(&self) -> bool {
        matches!(self, UserCommand::SelectTrack(_) | UserCommand::PlayAll)
    }
}
