//! Platform-agnostic media resource trait
//!
//! Abstracts the single playable audio resource the controller drives
//! (an HTML-style audio element, a cpal output stream, a test fake).

/// One playable audio resource
///
/// All calls are fire-and-forget: loading, starting and pausing happen
/// inside the resource, and their outcome is reported back asynchronously as
/// [`MediaEvent`](crate::MediaEvent)s which the host feeds into
/// [`PlaybackController::handle_media_event`](crate::PlaybackController::handle_media_event).
///
/// A resource that fails to load a locator simply never reports
/// `MetadataReady` for it.
pub trait MediaResource {
    /// Load a locator, or unload to idle with `None`
    ///
    /// Loading a new locator resets the playback position and eventually
    /// produces `MetadataReady { duration }`.
    fn set_source(&mut self, locator: Option<&str>);

    /// Currently loaded locator
    fn source(&self) -> Option<&str>;

    /// Start or resume playback of the loaded source
    fn play(&mut self);

    /// Pause playback, keeping the position
    fn pause(&mut self);

    /// Output volume in `0.0..=1.0`
    fn volume(&self) -> f32;

    /// Set output volume in `0.0..=1.0`
    fn set_volume(&mut self, volume: f32);

    /// Current playback position in seconds
    fn current_time(&self) -> f64;
}
