/// Desktop audio errors
use thiserror::Error;

/// Result type for audio operations
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio errors
#[derive(Debug, Error)]
pub enum AudioError {
    /// Device not found
    #[error("Audio device not found")]
    DeviceNotFound,

    /// Device error
    #[error("Device error: {0}")]
    DeviceError(String),

    /// Failed to build output stream
    #[error("Failed to build output stream: {0}")]
    StreamBuildError(String),

    /// Failed to play stream
    #[error("Failed to play stream: {0}")]
    PlayError(String),

    /// Audio thread went away before reporting its configuration
    #[error("Audio thread stopped unexpectedly")]
    AudioThreadGone,

    /// File could not be opened
    #[error("Failed to open {path}: {source}")]
    Open {
        /// Resolved file path
        path: String,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Unsupported or corrupt audio format
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Container has no decodable audio track
    #[error("No audio tracks found")]
    NoAudioTrack,

    /// Decoding failed mid-stream
    #[error("Decode error: {0}")]
    Decode(String),

    /// Sample rate conversion error
    #[error("Sample rate conversion error: {0}")]
    ResampleError(String),
}

impl From<cpal::BuildStreamError> for AudioError {
    fn from(err: cpal::BuildStreamError) -> Self {
        AudioError::StreamBuildError(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(err: cpal::PlayStreamError) -> Self {
        AudioError::PlayError(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for AudioError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        AudioError::DeviceError(err.to_string())
    }
}

impl From<rubato::ResamplerConstructionError> for AudioError {
    fn from(err: rubato::ResamplerConstructionError) -> Self {
        AudioError::ResampleError(err.to_string())
    }
}

impl From<rubato::ResampleError> for AudioError {
    fn from(err: rubato::ResampleError) -> Self {
        AudioError::ResampleError(err.to_string())
    }
}
