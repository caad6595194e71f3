//! Keyboard input
//!
//! Lines typed on stdin are parsed into host commands on a reader thread and
//! forwarded over a channel to the event loop.

use std::io::BufRead;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use mixtape_playback::volume::MAX_LEVEL;
use mixtape_playback::UserCommand;
use tracing::debug;

use crate::error::{AppError, Result};

/// Usage summary printed by `h`
pub const HELP: &str = "\
Commands:
  <n>      play / stop track n
  a        play all / stop
  p        pause
  v <0-100> set volume
  h        show this help
  q        quit";

/// A parsed input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Forward to the playback controller
    Player(UserCommand),
    Help,
    Quit,
}

/// Parse one input line
///
/// Returns `Ok(None)` for blank lines. Track numbers are 1-based.
pub fn parse_line(line: &str) -> Result<Option<HostCommand>> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    if words.next().is_some() {
        return Err(AppError::InvalidCommand(line.trim().to_string()));
    }

    let command = match (head.to_ascii_lowercase().as_str(), arg) {
        ("a", None) => HostCommand::Player(UserCommand::PlayAll),
        ("p", None) => HostCommand::Player(UserCommand::Pause),
        ("h" | "?", None) => HostCommand::Help,
        ("q", None) => HostCommand::Quit,
        ("v", Some(level)) => HostCommand::Player(UserCommand::SetVolume(parse_level(level)?)),
        (number, None) => HostCommand::Player(UserCommand::SelectTrack(parse_track(number)?)),
        _ => return Err(AppError::InvalidCommand(line.trim().to_string())),
    };

    Ok(Some(command))
}

fn parse_track(word: &str) -> Result<usize> {
    match word.parse::<usize>() {
        Ok(number) if number > 0 => Ok(number - 1),
        _ => Err(AppError::InvalidCommand(format!("unknown command {word:?}"))),
    }
}

fn parse_level(word: &str) -> Result<u8> {
    match word.parse::<u8>() {
        Ok(level) if level <= MAX_LEVEL => Ok(level),
        _ => Err(AppError::InvalidCommand(format!(
            "volume must be 0-{MAX_LEVEL}, got {word:?}"
        ))),
    }
}

/// Spawn the stdin reader thread
///
/// Each line is sent as-is; the channel closes when stdin does.
pub fn spawn_stdin_reader(tx: Sender<String>) -> Result<JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name("mixtape-stdin".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
            debug!("Input closed");
        })?;

    Ok(handle)
}
