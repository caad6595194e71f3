//! Playback controller - core orchestration
//!
//! Keeps the single media resource, the track rows and the controls strip
//! consistent. State lives here only; displays receive explicit commands.

use tracing::{debug, trace, warn};

use crate::{
    display::{ControlPanel, TrackDisplay},
    error::{PlaybackError, Result},
    events::{MediaEvent, UserCommand},
    format::format_time,
    media::MediaResource,
    probe::DurationProbe,
    types::{PlaybackState, PlayerStatus},
    volume::{level_to_volume, MAX_LEVEL},
};

/// Lifecycle of the one-time duration probe
#[derive(Debug)]
enum ProbePhase {
    NotStarted,
    Running(DurationProbe),
    Done,
}

/// Track list playback controller
///
/// Generic over the media resource `M`, the track rows `T` and the controls
/// strip `C`, so the same state machine drives a terminal, a GUI or a test
/// fake.
///
/// All methods run to completion and are expected to be called from one
/// thread, the same one that delivers media events.
#[derive(Debug)]
pub struct PlaybackController<M, T, C> {
    media: M,
    tracks: Vec<T>,
    controls: C,
    state: PlaybackState,
    probe: ProbePhase,
}

impl<M, T, C> PlaybackController<M, T, C>
where
    M: MediaResource,
    T: TrackDisplay,
    C: ControlPanel,
{
    /// Create a controller in the idle state
    ///
    /// Nothing is sent to the media resource until [`start`](Self::start).
    pub fn new(media: M, tracks: Vec<T>, controls: C) -> Self {
        Self {
            media,
            tracks,
            controls,
            state: PlaybackState::default(),
            probe: ProbePhase::NotStarted,
        }
    }

    /// Run the startup duration probe
    ///
    /// Only the first call has an effect.
    pub fn start(&mut self) {
        if !matches!(self.probe, ProbePhase::NotStarted) {
            warn!("Duration probe already started, ignoring");
            return;
        }

        let probe = DurationProbe::start(&mut self.media, &mut self.tracks, &mut self.controls);
        self.probe = if probe.status().is_complete() {
            ProbePhase::Done
        } else {
            ProbePhase::Running(probe)
        };
    }

    // ===== Inspection =====

    /// Whether the duration probe currently owns the media resource
    pub fn is_probing(&self) -> bool {
        matches!(self.probe, ProbePhase::Running(_))
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn status(&self) -> PlayerStatus {
        self.state.status()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.current
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    pub fn is_play_all(&self) -> bool {
        self.state.play_all
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[T] {
        &self.tracks
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn controls(&self) -> &C {
        &self.controls
    }

    /// Give the collaborators back
    pub fn into_parts(self) -> (M, Vec<T>, C) {
        (self.media, self.tracks, self.controls)
    }

    // ===== Playback Control =====

    /// Play track `index`
    ///
    /// Loads the track only when it is not already the loaded source, so
    /// calling this on the playing track keeps its position and re-asserts
    /// the selection.
    pub fn play(&mut self, index: usize) -> Result<()> {
        if self.is_probing() {
            return Err(PlaybackError::ProbeInProgress);
        }

        let locator = self
            .tracks
            .get(index)
            .ok_or(PlaybackError::IndexOutOfBounds(index))?
            .locator()
            .to_string();

        if self.media.source() != Some(locator.as_str()) {
            self.deselect();
            self.media.set_source(Some(&locator));
            debug!(index, locator = %locator, "Loaded track");
        } else if self.state.current.is_some_and(|current| current != index) {
            // Same source under another row: keep a single selection
            self.deselect();
        }

        self.media.play();
        self.state.playing = true;
        self.state.current = Some(index);
        self.tracks[index].set_selected(true);

        debug!(index, play_all = self.state.play_all, "Playing");
        Ok(())
    }

    /// Stop playback and return to idle
    ///
    /// Always clears the selection and "play all" mode. Idempotent.
    pub fn pause(&mut self) {
        self.media.pause();
        self.state.playing = false;
        self.state.play_all = false;
        self.deselect();
        self.controls.set_selected(false);

        debug!("Paused");
    }

    /// Toggle sequential "play all" mode
    ///
    /// Starts at the first track, or stops the running sequence.
    pub fn play_all(&mut self) -> Result<()> {
        if self.state.play_all {
            self.pause();
            return Ok(());
        }

        if self.is_probing() {
            return Err(PlaybackError::ProbeInProgress);
        }

        if self.tracks.is_empty() {
            return Err(PlaybackError::EmptyTrackList);
        }

        self.state.play_all = true;
        self.controls.set_selected(true);
        self.play(0)
    }

    /// Advance a "play all" sequence, or finish it after the last track
    fn play_next(&mut self) {
        let next = self.state.current.map_or(0, |current| current + 1);

        if next < self.tracks.len() {
            if let Err(e) = self.play(next) {
                warn!(next, error = %e, "Could not advance play-all sequence");
                self.pause();
            }
        } else {
            debug!("Play-all sequence exhausted");
            self.pause();
        }
    }

    /// Handle a click on track row `index`
    ///
    /// Clicking the playing track stops it; clicking any other track
    /// switches to it.
    pub fn on_track_selected(&mut self, index: usize) -> Result<()> {
        if self.is_probing() {
            return Err(PlaybackError::ProbeInProgress);
        }

        if index >= self.tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }

        let previous = self.state.current;
        self.pause();

        if previous != Some(index) {
            self.play(index)?;
        }

        Ok(())
    }

    /// Handle a volume slider change (`0..=100`)
    ///
    /// Also moves the slider to the applied level.
    pub fn on_volume_changed(&mut self, level: u8) {
        let level = level.min(MAX_LEVEL);
        self.controls.set_value(level);

        let volume = level_to_volume(level);
        self.media.set_volume(volume);
        trace!(level, volume, "Volume changed");
    }

    // ===== Dispatch =====

    /// Apply a user command
    ///
    /// Commands that would load a source while the duration probe is running
    /// are dropped with a warning.
    pub fn handle_command(&mut self, command: UserCommand) -> Result<()> {
        let result = match command {
            UserCommand::SelectTrack(index) => self.on_track_selected(index),
            UserCommand::PlayAll => self.play_all(),
            UserCommand::Pause => {
                self.pause();
                Ok(())
            }
            UserCommand::SetVolume(level) => {
                self.on_volume_changed(level);
                Ok(())
            }
        };

        match result {
            Err(PlaybackError::ProbeInProgress) => {
                warn!(?command, "Durations are still loading, ignoring command");
                Ok(())
            }
            other => other,
        }
    }

    /// Apply a notification from the media resource
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::MetadataReady { duration } => self.on_metadata_ready(duration),
            MediaEvent::TimeAdvanced => self.on_time_advanced(),
            MediaEvent::PlaybackEnded => self.on_playback_ended(),
        }
    }

    fn on_metadata_ready(&mut self, duration: f64) {
        let ProbePhase::Running(probe) = &mut self.probe else {
            // Only the probe listens for metadata
            trace!(duration, "Metadata ready, no listener");
            return;
        };

        let status =
            probe.on_metadata_ready(duration, &mut self.media, &mut self.tracks, &mut self.controls);

        if status.is_complete() {
            self.probe = ProbePhase::Done;
        }
    }

    fn on_time_advanced(&mut self) {
        let Some(index) = self.state.current else {
            return;
        };

        let display = format_time(self.media.current_time());
        if let Some(track) = self.tracks.get_mut(index) {
            track.set_current_time(&display);
        }
    }

    fn on_playback_ended(&mut self) {
        if self.state.play_all {
            self.play_next();
        } else {
            // The resource stopped by itself; nothing is playing any more
            self.deselect();
            self.state.playing = false;
            debug!("Track ended");
        }
    }

    /// Un-highlight the selected track, if any
    fn deselect(&mut self) {
        if let Some(index) = self.state.current.take() {
            if let Some(track) = self.tracks.get_mut(index) {
                track.set_selected(false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{PlayAllControl, TotalTimeDisplay, VolumeControl};

    #[derive(Default)]
    struct Media {
        source: Option<String>,
        volume: f32,
        time: f64,
        plays: usize,
        pauses: usize,
        loads: usize,
    }

    impl MediaResource for Media {
        fn set_source(&mut self, locator: Option<&str>) {
            self.source = locator.map(str::to_string);
            self.loads += 1;
        }
        fn source(&self) -> Option<&str> {
            self.source.as_deref()
        }
        fn play(&mut self) {
            self.plays += 1;
        }
        fn pause(&mut self) {
            self.pauses += 1;
        }
        fn volume(&self) -> f32 {
            self.volume
        }
        fn set_volume(&mut self, volume: f32) {
            self.volume = volume;
        }
        fn current_time(&self) -> f64 {
            self.time
        }
    }

    #[derive(Default)]
    struct Row {
        locator: String,
        selected: bool,
        clock: Option<String>,
    }

    impl TrackDisplay for Row {
        fn locator(&self) -> &str {
            &self.locator
        }
        fn set_selected(&mut self, selected: bool) {
            self.selected = selected;
        }
        fn set_current_time(&mut self, display: &str) {
            self.clock = Some(display.to_string());
        }
        fn set_total_time(&mut self, _display: &str) {}
    }

    #[derive(Default)]
    struct Panel {
        all_selected: bool,
        volume: u8,
    }

    impl PlayAllControl for Panel {
        fn set_selected(&mut self, selected: bool) {
            self.all_selected = selected;
        }
    }

    impl VolumeControl for Panel {
        fn value(&self) -> u8 {
            self.volume
        }
        fn set_value(&mut self, level: u8) {
            self.volume = level;
        }
    }

    impl TotalTimeDisplay for Panel {
        fn set_text(&mut self, _display: &str) {}
    }

    fn controller(count: usize) -> PlaybackController<Media, Row, Panel> {
        let rows = (0..count)
            .map(|i| Row {
                locator: format!("track{}.mp3", i),
                ..Default::default()
            })
            .collect();
        PlaybackController::new(Media::default(), rows, Panel::default())
    }

    #[test]
    fn create_controller() {
        let controller = controller(3);
        assert_eq!(controller.status(), PlayerStatus::Idle);
        assert_eq!(controller.track_count(), 3);
        assert!(!controller.is_probing());
    }

    #[test]
    fn replaying_loaded_track_does_not_reload() {
        let mut controller = controller(2);
        controller.play(1).unwrap();
        controller.play(1).unwrap();

        assert_eq!(controller.media().loads, 1);
        assert_eq!(controller.media().plays, 2);
        assert!(controller.tracks()[1].selected);
    }

    #[test]
    fn invalid_index_leaves_state_untouched() {
        let mut controller = controller(2);
        controller.play(0).unwrap();

        assert_eq!(controller.play(5), Err(PlaybackError::IndexOutOfBounds(5)));
        assert_eq!(
            controller.on_track_selected(7),
            Err(PlaybackError::IndexOutOfBounds(7))
        );
        assert_eq!(controller.status(), PlayerStatus::Playing { index: 0 });
    }

    #[test]
    fn play_all_on_empty_list_is_rejected() {
        let mut controller = controller(0);
        assert_eq!(controller.play_all(), Err(PlaybackError::EmptyTrackList));
        assert!(!controller.is_play_all());
        assert!(!controller.controls().all_selected);
    }

    #[test]
    fn commands_wait_for_probe() {
        let mut controller = controller(2);
        controller.start();
        assert!(controller.is_probing());

        controller.handle_command(UserCommand::SelectTrack(1)).unwrap();
        controller.handle_command(UserCommand::PlayAll).unwrap();
        assert_eq!(controller.status(), PlayerStatus::Idle);
        assert_eq!(controller.media().plays, 0);

        controller.handle_command(UserCommand::SetVolume(30)).unwrap();
        assert_eq!(controller.media().volume, 0.3);
    }

    #[test]
    fn start_runs_only_once() {
        let mut controller = controller(1);
        controller.start();
        controller.handle_media_event(MediaEvent::MetadataReady { duration: 3.0 });
        assert!(!controller.is_probing());
        let loads = controller.media().loads;

        controller.start();

        assert!(!controller.is_probing());
        assert_eq!(controller.media().loads, loads);
    }

    #[test]
    fn time_advanced_updates_selected_clock() {
        let mut controller = controller(2);
        controller.play(1).unwrap();
        controller.media.time = 65.2;

        controller.handle_media_event(MediaEvent::TimeAdvanced);

        assert_eq!(controller.tracks()[1].clock.as_deref(), Some("1:05"));
        assert_eq!(controller.tracks()[0].clock, None);
    }

    #[test]
    fn ended_without_play_all_deselects() {
        let mut controller = controller(2);
        controller.play(0).unwrap();

        controller.handle_media_event(MediaEvent::PlaybackEnded);

        assert_eq!(controller.status(), PlayerStatus::Idle);
        assert_eq!(controller.current_index(), None);
        assert!(!controller.is_playing());
        assert!(!controller.tracks()[0].selected);
        // The source stays loaded so a replay does not reload
        assert_eq!(controller.media().source(), Some("track0.mp3"));
    }
}
