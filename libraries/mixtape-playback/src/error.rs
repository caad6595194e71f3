//! Error types for playback control

use thiserror::Error;

/// Playback errors
///
/// Only contract violations surface as errors. Expected user interactions
/// (repeated clicks, pausing while idle) are plain state transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// Track index outside the track list
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Operation needs at least one track
    #[error("Track list is empty")]
    EmptyTrackList,

    /// The duration probe still owns the media resource
    #[error("Duration probe in progress")]
    ProbeInProgress,
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
