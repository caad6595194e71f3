//! Terminal renditions of the track rows and the controls strip
//!
//! These types only store what the controller tells them; rendering to text
//! is a pure function of that state.

use mixtape_playback::{
    format_time, PlayAllControl, TotalTimeDisplay, TrackDisplay, TrackRef, VolumeControl,
};

use crate::config::CatalogEntry;

/// One row of the track list
#[derive(Debug, Clone)]
pub struct TerminalTrack {
    track: TrackRef,
    title: String,
    selected: bool,
    current: String,
    total: String,
}

impl TerminalTrack {
    pub fn new(id: usize, entry: &CatalogEntry) -> Self {
        Self {
            track: TrackRef::new(id, entry.file.clone()),
            title: entry.display_title().to_string(),
            selected: false,
            current: format_time(0.0),
            total: format_time(0.0),
        }
    }

    /// Build every row of a catalog, in order
    pub fn from_catalog(entries: &[CatalogEntry]) -> Vec<Self> {
        entries
            .iter()
            .enumerate()
            .map(|(id, entry)| Self::new(id, entry))
            .collect()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn current_time(&self) -> &str {
        &self.current
    }

    pub fn total_time(&self) -> &str {
        &self.total
    }

    /// Row text: number (1-based), play marker, title and times
    pub fn render(&self) -> String {
        let marker = if self.selected { '>' } else { ' ' };
        format!(
            "{marker} {:>2}. {}  {} / {}",
            self.track.id + 1,
            self.title,
            self.current,
            self.total
        )
    }
}

impl TrackDisplay for TerminalTrack {
    fn locator(&self) -> &str {
        &self.track.locator
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn set_current_time(&mut self, display: &str) {
        self.current = display.to_string();
    }

    fn set_total_time(&mut self, display: &str) {
        self.total = display.to_string();
    }
}

/// Play-all button, volume slider and aggregate duration
#[derive(Debug, Clone)]
pub struct TerminalControls {
    play_all_selected: bool,
    volume: u8,
    total: String,
}

impl TerminalControls {
    pub fn new() -> Self {
        Self {
            play_all_selected: false,
            volume: 100,
            total: format_time(0.0),
        }
    }

    pub fn is_play_all_selected(&self) -> bool {
        self.play_all_selected
    }

    pub fn total(&self) -> &str {
        &self.total
    }

    /// "Play All [m:ss]" or, while play-all runs, "Stop [m:ss]"
    pub fn render_play_all(&self) -> String {
        let label = if self.play_all_selected {
            "Stop"
        } else {
            "Play All"
        };
        format!("{label} [{}]", self.total)
    }

    pub fn render(&self) -> String {
        format!("{}    Volume: {}", self.render_play_all(), self.volume)
    }
}

impl Default for TerminalControls {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayAllControl for TerminalControls {
    fn set_selected(&mut self, selected: bool) {
        self.play_all_selected = selected;
    }
}

impl VolumeControl for TerminalControls {
    fn value(&self) -> u8 {
        self.volume
    }

    fn set_value(&mut self, level: u8) {
        self.volume = level;
    }
}

impl TotalTimeDisplay for TerminalControls {
    fn set_text(&mut self, display: &str) {
        self.total = display.to_string();
    }
}

/// Full screen: title, one line per track, then the controls strip
pub fn render_screen(title: &str, tracks: &[TerminalTrack], controls: &TerminalControls) -> String {
    let mut lines = Vec::with_capacity(tracks.len() + 4);
    lines.push(title.to_string());
    lines.push(String::new());
    lines.extend(tracks.iter().map(TerminalTrack::render));
    lines.push(String::new());
    lines.push(controls.render());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(file: &str, title: Option<&str>) -> CatalogEntry {
        CatalogEntry {
            file: file.to_string(),
            title: title.map(str::to_string),
        }
    }

    #[test]
    fn new_row_shows_zero_times() {
        let track = TerminalTrack::new(0, &entry("Press_One.mp3", Some("Press one")));

        assert_eq!(track.locator(), "Press_One.mp3");
        assert_eq!(track.render(), "   1. Press one  0:00 / 0:00");
    }

    #[test]
    fn selected_row_is_marked() {
        let mut track = TerminalTrack::new(11, &entry("b.mp3", None));
        track.set_selected(true);
        track.set_current_time("0:42");
        track.set_total_time("3:05");

        assert_eq!(track.render(), "> 12. b.mp3  0:42 / 3:05");
    }

    #[test]
    fn play_all_label_follows_selection() {
        let mut controls = TerminalControls::new();
        controls.set_text("4:10");
        assert_eq!(controls.render_play_all(), "Play All [4:10]");

        PlayAllControl::set_selected(&mut controls, true);
        assert_eq!(controls.render_play_all(), "Stop [4:10]");
    }

    #[test]
    fn controls_show_volume() {
        let mut controls = TerminalControls::new();
        controls.set_value(75);
        assert_eq!(controls.render(), "Play All [0:00]    Volume: 75");
    }

    #[test]
    fn screen_lists_every_track() {
        let tracks = TerminalTrack::from_catalog(&[entry("a.mp3", None), entry("b.mp3", None)]);
        let screen = render_screen("Demo", &tracks, &TerminalControls::new());

        let lines: Vec<&str> = screen.lines().collect();
        assert_eq!(lines[0], "Demo");
        assert_eq!(lines[2], "   1. a.mp3  0:00 / 0:00");
        assert_eq!(lines[3], "   2. b.mp3  0:00 / 0:00");
        assert_eq!(lines[5], "Play All [0:00]    Volume: 100");
    }
}
