//! Shared test doubles for the playback controller
//!
//! Each fake records every call it receives so tests can assert on the
//! exact commands issued by the controller.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use mixtape_playback::{
    MediaResource, PlayAllControl, PlaybackController, TotalTimeDisplay, TrackDisplay,
    VolumeControl,
};

/// Calls received by a fake track row
#[derive(Debug, Clone, PartialEq)]
pub enum TrackCall {
    Selected(bool),
    CurrentTime(String),
    TotalTime(String),
}

/// Recording track row
#[derive(Debug, Clone)]
pub struct FakeTrack {
    pub locator: String,
    pub selected: bool,
    pub current_time: Option<String>,
    pub total_time: Option<String>,
    pub calls: Vec<TrackCall>,
}

impl FakeTrack {
    pub fn new(locator: &str) -> Self {
        Self {
            locator: locator.to_string(),
            selected: false,
            current_time: None,
            total_time: None,
            calls: Vec::new(),
        }
    }
}

impl TrackDisplay for FakeTrack {
    fn locator(&self) -> &str {
        &self.locator
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
        self.calls.push(TrackCall::Selected(selected));
    }

    fn set_current_time(&mut self, display: &str) {
        self.current_time = Some(display.to_string());
        self.calls.push(TrackCall::CurrentTime(display.to_string()));
    }

    fn set_total_time(&mut self, display: &str) {
        self.total_time = Some(display.to_string());
        self.calls.push(TrackCall::TotalTime(display.to_string()));
    }
}

/// Calls received by the fake media resource
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    SetSource(Option<String>),
    Play,
    Pause,
    SetVolume(f32),
}

/// Recording media resource
///
/// Playback position comes from a clock shared with the test, since the
/// controller owns the resource once constructed.
#[derive(Debug, Clone)]
pub struct FakeMedia {
    pub source: Option<String>,
    pub volume: f32,
    pub clock: Rc<Cell<f64>>,
    pub calls: Vec<MediaCall>,
}

impl Default for FakeMedia {
    fn default() -> Self {
        Self {
            source: None,
            volume: 1.0,
            clock: Rc::new(Cell::new(0.0)),
            calls: Vec::new(),
        }
    }
}

impl FakeMedia {
    pub fn loads(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, MediaCall::SetSource(Some(_))))
            .count()
    }
}

impl MediaResource for FakeMedia {
    fn set_source(&mut self, locator: Option<&str>) {
        self.source = locator.map(str::to_string);
        self.clock.set(0.0);
        self.calls.push(MediaCall::SetSource(self.source.clone()));
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn play(&mut self) {
        self.calls.push(MediaCall::Play);
    }

    fn pause(&mut self) {
        self.calls.push(MediaCall::Pause);
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.calls.push(MediaCall::SetVolume(volume));
    }

    fn current_time(&self) -> f64 {
        self.clock.get()
    }
}

/// Recording controls strip
#[derive(Debug, Clone, Default)]
pub struct FakeControls {
    pub play_all_selected: bool,
    pub volume: Option<u8>,
    pub total: Option<String>,
}

impl PlayAllControl for FakeControls {
    fn set_selected(&mut self, selected: bool) {
        self.play_all_selected = selected;
    }
}

impl VolumeControl for FakeControls {
    fn value(&self) -> u8 {
        self.volume.unwrap_or(0)
    }

    fn set_value(&mut self, level: u8) {
        self.volume = Some(level);
    }
}

impl TotalTimeDisplay for FakeControls {
    fn set_text(&mut self, display: &str) {
        self.total = Some(display.to_string());
    }
}

pub type TestController = PlaybackController<FakeMedia, FakeTrack, FakeControls>;

/// Controller over tracks named `A0.mp3`, `B0.mp3`, ...
pub fn create_controller(count: usize) -> TestController {
    create_controller_with_media(count, FakeMedia::default())
}

/// Controller plus a handle on its media clock
pub fn create_controller_with_clock(count: usize) -> (TestController, Rc<Cell<f64>>) {
    let media = FakeMedia::default();
    let clock = Rc::clone(&media.clock);
    (create_controller_with_media(count, media), clock)
}

pub fn create_controller_with_media(count: usize, media: FakeMedia) -> TestController {
    let tracks = (0..count)
        .map(|i| {
            let letter = char::from(b'A' + (i % 26) as u8);
            FakeTrack::new(&format!("{}{}.mp3", letter, i / 26))
        })
        .collect();

    PlaybackController::new(media, tracks, FakeControls::default())
}

/// Number of selected rows
pub fn selected_count(controller: &TestController) -> usize {
    controller.tracks().iter().filter(|t| t.selected).count()
}
