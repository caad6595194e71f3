//! Core types for playback control

use serde::{Deserialize, Serialize};

/// Immutable reference to one entry of the track list
///
/// `id` is the track's position in the ordered list and stays stable for the
/// whole session. Locators must be unique within a list, because "is this
/// track already loaded" is answered by comparing locators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackRef {
    /// Index into the track list
    pub id: usize,

    /// URI or path handed to the media resource
    pub locator: String,
}

impl TrackRef {
    /// Create a new track reference
    pub fn new(id: usize, locator: impl Into<String>) -> Self {
        Self {
            id,
            locator: locator.into(),
        }
    }
}

/// Playback state owned by the controller
///
/// Invariants (upheld by `PlaybackController`):
/// - `current` is `None` or a valid index into the track list
/// - `playing` implies `current.is_some()`
/// - selection is derived from `current` only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Selected track, `None` when idle
    pub current: Option<usize>,

    /// Whether the media resource was told to play
    pub playing: bool,

    /// Sequential "play all" mode
    pub play_all: bool,
}

impl PlaybackState {
    /// Derived state machine view
    pub fn status(&self) -> PlayerStatus {
        match (self.playing, self.current) {
            (true, Some(index)) => PlayerStatus::Playing { index },
            _ => PlayerStatus::Idle,
        }
    }
}

/// The two reachable player states
///
/// There is no "paused but selected" state: pausing always clears the
/// selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// Nothing selected, nothing playing
    Idle,

    /// Track `index` selected and playing
    Playing { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_idle() {
        let state = PlaybackState::default();
        assert_eq!(state.current, None);
        assert!(!state.playing);
        assert!(!state.play_all);
        assert_eq!(state.status(), PlayerStatus::Idle);
    }

    #[test]
    fn status_reports_playing_index() {
        let state = PlaybackState {
            current: Some(2),
            playing: true,
            play_all: false,
        };
        assert_eq!(state.status(), PlayerStatus::Playing { index: 2 });
    }

    #[test]
    fn track_ref_creation() {
        let track = TrackRef::new(3, "Press_One.mp3");
        assert_eq!(track.id, 3);
        assert_eq!(track.locator, "Press_One.mp3");
    }
}
