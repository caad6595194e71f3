//! Display proxies driven by the controller
//!
//! The controller never exposes its state to the UI layer for mutation.
//! Instead it issues explicit commands through these traits, and the UI
//! turns them into whatever rendering it uses.

/// One row of the track list
pub trait TrackDisplay {
    /// Locator handed to the media resource when this track plays
    fn locator(&self) -> &str;

    /// Highlight (or un-highlight) the row as the playing track
    fn set_selected(&mut self, selected: bool);

    /// Show the current playback position, already formatted
    fn set_current_time(&mut self, display: &str);

    /// Show the track's total duration, already formatted
    fn set_total_time(&mut self, display: &str);
}

/// The "play all" toggle button
pub trait PlayAllControl {
    fn set_selected(&mut self, selected: bool);
}

/// Volume slider with a `0..=100` scale
pub trait VolumeControl {
    /// Currently displayed value
    fn value(&self) -> u8;

    /// Display a new value without notifying back
    fn set_value(&mut self, level: u8);
}

/// Aggregate duration of the whole track list
pub trait TotalTimeDisplay {
    fn set_text(&mut self, display: &str);
}

/// The controls strip above the track list
///
/// Implemented automatically for anything that provides all three controls.
pub trait ControlPanel: PlayAllControl + VolumeControl + TotalTimeDisplay {}

impl<T> ControlPanel for T where T: PlayAllControl + VolumeControl + TotalTimeDisplay {}
