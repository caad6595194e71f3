//! Player sessions
//!
//! Wires a media resource, the terminal rows and the controls strip into one
//! `PlaybackController` and pumps events into it from a single thread.

use std::io::Write;

use crossbeam_channel::{select, unbounded};
use mixtape_audio_desktop::{DesktopConfig, DesktopMediaResource, MetadataResource};
use mixtape_playback::{MediaEvent, MediaResource, PlaybackController};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::input::{parse_line, spawn_stdin_reader, HostCommand, HELP};
use crate::view::{render_screen, TerminalControls, TerminalTrack};

/// Controller driving terminal rows
pub type TerminalController<M> = PlaybackController<M, TerminalTrack, TerminalControls>;

/// Build a controller over the configured catalog
pub fn build_controller<M: MediaResource>(media: M, config: &AppConfig) -> TerminalController<M> {
    let tracks = TerminalTrack::from_catalog(&config.tracks);
    PlaybackController::new(media, tracks, TerminalControls::new())
}

/// Run the duration probe without an audio device
///
/// The returned controller is still probing if some file failed to load.
pub fn probe_catalog(config: &AppConfig) -> TerminalController<MetadataResource> {
    let media = MetadataResource::new(&config.player.base_dir);
    let events = media.events();

    let mut controller = build_controller(media, config);
    controller.start();

    // Metadata is queued synchronously, one file per event
    while let Ok(event) = events.try_recv() {
        controller.handle_media_event(event);
    }

    controller
}

/// Interactive playback on the default output device
///
/// Returns when the user quits or stdin closes.
pub fn run_player(config: &AppConfig) -> Result<()> {
    let mut media = DesktopMediaResource::new(DesktopConfig {
        base_dir: config.player.base_dir.clone(),
        time_update_interval: config.player.time_update_interval(),
    })?;
    media.set_volume(config.player.initial_volume);
    let media_events = media.events();

    let mut controller = build_controller(media, config);

    let (input_tx, input_rx) = unbounded::<String>();
    let _reader = spawn_stdin_reader(input_tx)?;

    info!(tracks = controller.track_count(), "Starting player");
    controller.start();

    let mut out = std::io::stdout();
    redraw(&mut out, &config.player.title, &controller)?;

    loop {
        select! {
            recv(input_rx) -> line => {
                let Ok(line) = line else { break };

                match parse_line(&line) {
                    Ok(Some(HostCommand::Quit)) => break,
                    Ok(Some(HostCommand::Help)) => writeln!(out, "{HELP}")?,
                    Ok(Some(HostCommand::Player(command))) => {
                        if let Err(e) = controller.handle_command(command) {
                            warn!(?command, error = %e, "Command rejected");
                        }
                        redraw(&mut out, &config.player.title, &controller)?;
                    }
                    Ok(None) => {}
                    Err(e) => writeln!(out, "{e} (h for help)")?,
                }
            }
            recv(media_events) -> event => {
                let Ok(tagged) = event else { break };
                // Stale end or progress from the previous track
                let Some(event) = controller.media().accept(tagged) else { continue };
                controller.handle_media_event(event);

                if event == MediaEvent::TimeAdvanced {
                    show_progress(&mut out, &controller)?;
                } else {
                    redraw(&mut out, &config.player.title, &controller)?;
                }
            }
        }
    }

    controller.pause();
    info!("Player stopped");
    Ok(())
}

fn redraw<M: MediaResource>(
    out: &mut impl Write,
    title: &str,
    controller: &TerminalController<M>,
) -> Result<()> {
    let screen = render_screen(title, controller.tracks(), controller.controls());
    writeln!(out, "\n{screen}")?;
    if controller.is_probing() {
        writeln!(out, "Reading track durations...")?;
    }
    out.flush()?;
    Ok(())
}

/// Rewrite the current line with the playing row
fn show_progress<M: MediaResource>(
    out: &mut impl Write,
    controller: &TerminalController<M>,
) -> Result<()> {
    let Some(index) = controller.current_index() else {
        return Ok(());
    };

    if let Some(track) = controller.tracks().get(index) {
        write!(out, "\r\x1b[2K{}", track.render())?;
        out.flush()?;
    }
    Ok(())
}
