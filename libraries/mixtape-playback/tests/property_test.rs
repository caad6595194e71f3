//! Property-based tests for the playback controller
//!
//! Uses proptest to drive the controller with arbitrary interleavings of
//! user commands and media events and checks the state invariants after
//! every step.

mod common;

use common::{create_controller, selected_count, TestController};
use mixtape_playback::{format_time, MediaEvent, PlayerStatus, UserCommand};
use proptest::prelude::*;

// ===== Helpers =====

#[derive(Debug, Clone)]
enum Input {
    Command(UserCommand),
    Media(MediaEvent),
    Play(usize),
}

fn arbitrary_input(track_count: usize) -> impl Strategy<Value = Input> {
    prop_oneof![
        (0..track_count).prop_map(|i| Input::Command(UserCommand::SelectTrack(i))),
        Just(Input::Command(UserCommand::PlayAll)),
        Just(Input::Command(UserCommand::Pause)),
        (0u8..=100).prop_map(|level| Input::Command(UserCommand::SetVolume(level))),
        Just(Input::Media(MediaEvent::TimeAdvanced)),
        Just(Input::Media(MediaEvent::PlaybackEnded)),
        (0.0f64..600.0).prop_map(|duration| Input::Media(MediaEvent::MetadataReady { duration })),
        (0..track_count).prop_map(Input::Play),
    ]
}

fn scenario() -> impl Strategy<Value = (usize, Vec<Input>)> {
    (1usize..8).prop_flat_map(|count| {
        (
            Just(count),
            prop::collection::vec(arbitrary_input(count), 1..60),
        )
    })
}

fn apply(controller: &mut TestController, input: &Input) {
    match input {
        Input::Command(command) => controller.handle_command(*command).unwrap(),
        Input::Media(event) => controller.handle_media_event(*event),
        Input::Play(index) => controller.play(*index).unwrap(),
    }
}

fn assert_invariants(controller: &TestController) -> Result<(), TestCaseError> {
    let state = controller.state();

    if let Some(index) = state.current {
        prop_assert!(index < controller.track_count(), "current out of range");
    }
    if state.playing {
        prop_assert!(state.current.is_some(), "playing without a selection");
    }

    // Selection is derived from the current index only
    prop_assert!(selected_count(controller) <= 1, "more than one row selected");
    for (i, track) in controller.tracks().iter().enumerate() {
        prop_assert_eq!(track.selected, state.current == Some(i));
    }

    prop_assert_eq!(controller.controls().play_all_selected, state.play_all);
    Ok(())
}

// ===== Property Tests =====

proptest! {
    /// Property: invariants hold after every input
    #[test]
    fn invariants_hold_for_any_sequence((count, inputs) in scenario()) {
        let mut controller = create_controller(count);

        for input in &inputs {
            apply(&mut controller, input);
            assert_invariants(&controller)?;
        }
    }

    /// Property: play(i) always ends in Playing(i)
    #[test]
    fn play_always_selects_requested_track(
        (count, inputs) in scenario(),
        target in 0usize..8
    ) {
        let mut controller = create_controller(count);
        for input in &inputs {
            apply(&mut controller, input);
        }

        let target = target % count;
        controller.play(target).unwrap();

        prop_assert_eq!(controller.status(), PlayerStatus::Playing { index: target });
        prop_assert_eq!(selected_count(&controller), 1);
    }

    /// Property: pause always ends in Idle, and twice equals once
    #[test]
    fn pause_always_idles((count, inputs) in scenario()) {
        let mut controller = create_controller(count);
        for input in &inputs {
            apply(&mut controller, input);
        }

        controller.pause();
        let once = controller.state();
        controller.pause();

        prop_assert_eq!(once.current, None);
        prop_assert!(!once.playing);
        prop_assert!(!once.play_all);
        prop_assert_eq!(controller.state(), once);
    }

    /// Property: selecting the current track toggles off, any other switches
    #[test]
    fn selection_toggles((count, inputs) in scenario(), target in 0usize..8) {
        let mut controller = create_controller(count);
        for input in &inputs {
            apply(&mut controller, input);
        }

        let target = target % count;
        let before = controller.current_index();
        controller.on_track_selected(target).unwrap();

        if before == Some(target) {
            prop_assert_eq!(controller.status(), PlayerStatus::Idle);
        } else {
            prop_assert_eq!(controller.status(), PlayerStatus::Playing { index: target });
        }
    }

    /// Property: formatted seconds are always two digits
    #[test]
    fn formatted_time_shape(seconds in 0.0f64..1_000_000.0) {
        let display = format_time(seconds);
        let (minutes, secs) = display.split_once(':').unwrap();

        prop_assert_eq!(secs.len(), 2);
        prop_assert!(secs.parse::<u64>().unwrap() < 60);
        prop_assert!(!minutes.is_empty());
        prop_assert!(minutes == "0" || !minutes.starts_with('0'));

        let rebuilt = minutes.parse::<u64>().unwrap() * 60 + secs.parse::<u64>().unwrap();
        prop_assert_eq!(rebuilt, seconds.round() as u64);
    }
}
