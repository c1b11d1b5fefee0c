use crate::{AppError, AppResult};

use std::{panic::Location, path::PathBuf, str::FromStr};

use error_location::ErrorLocation;

/// Commands typed at the terminal.
///
/// Positions are 1-based indices into the displayed recording list.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Start capturing.
    Record,
    /// Stop capturing and keep the recording.
    Stop,
    /// Label for the next recording.
    Label(String),
    /// Attach an image file as the next recording's cover.
    Cover(PathBuf),
    /// Drop the pending cover.
    Uncover,
    /// Play the recording at a position, or resume the selection.
    Play(Option<usize>),
    /// Pause the playing recording.
    Pause,
    /// Play the next recording in the list.
    Next,
    /// Play the previous recording in the list.
    Previous,
    /// Seek the selection to a percentage of its duration.
    Seek(f64),
    /// Delete the recording at a position.
    Delete(usize),
    /// Show the recording list.
    List,
    /// Show or hide the recording list after each command.
    Sidebar,
    /// Open the new-recording panel.
    New,
    /// Close the new-recording panel.
    Close,
    /// List audio input and output devices.
    Devices,
    /// Show command help.
    Help,
    /// Leave the application.
    Quit,
}

impl FromStr for AppCommand {
    type Err = AppError;

    #[track_caller]
    fn from_str(line: &str) -> AppResult<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let invalid = |reason: &str| AppError::InvalidCommand {
            input: line.to_string(),
            reason: reason.to_string(),
            location: ErrorLocation::from(Location::caller()),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "record" | "rec" => AppCommand::Record,
            "stop" => AppCommand::Stop,
            "label" => AppCommand::Label(rest.to_string()),
            "cover" if rest.is_empty() => return Err(invalid("cover needs an image path")),
            "cover" => AppCommand::Cover(PathBuf::from(rest)),
            "uncover" => AppCommand::Uncover,
            "play" if rest.is_empty() => AppCommand::Play(None),
            "play" => AppCommand::Play(Some(
                parse_position(rest).ok_or_else(|| invalid("play takes a list number"))?,
            )),
            "pause" => AppCommand::Pause,
            "next" => AppCommand::Next,
            "prev" | "previous" => AppCommand::Previous,
            "seek" => AppCommand::Seek(
                rest.trim_end_matches('%')
                    .parse::<f64>()
                    .ok()
                    .filter(|p| p.is_finite())
                    .ok_or_else(|| invalid("seek takes a percentage from 0 to 100"))?,
            ),
            "delete" | "rm" => AppCommand::Delete(
                parse_position(rest).ok_or_else(|| invalid("delete takes a list number"))?,
            ),
            "list" | "ls" => AppCommand::List,
            "sidebar" => AppCommand::Sidebar,
            "new" => AppCommand::New,
            "close" => AppCommand::Close,
            "devices" => AppCommand::Devices,
            "help" | "?" => AppCommand::Help,
            "quit" | "exit" => AppCommand::Quit,
            "" => return Err(invalid("empty command")),
            _ => return Err(invalid("unknown command")),
        };

        Ok(command)
    }
}

fn parse_position(text: &str) -> Option<usize> {
    text.parse::<usize>().ok().filter(|&n| n > 0)
}
