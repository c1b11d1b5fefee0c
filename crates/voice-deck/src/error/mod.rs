use voice_deck_core::AudioError;

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the voice-deck binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// Session or device error from voice-deck-core.
    #[error("Session error: {source} {location}")]
    Session {
        /// The underlying audio error.
        #[source]
        source: AudioError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading or saving error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem or terminal operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A terminal command line could not be understood.
    #[error("Invalid command {input:?}: {reason} {location}")]
    InvalidCommand {
        /// The line as typed.
        input: String,
        /// What was wrong with it.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

impl AppError {
    /// Short message for the terminal, without source locations.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Session { source, .. } => source.user_message(),
            AppError::ConfigError { reason, .. } => format!("Configuration error: {}", reason),
            AppError::IoError { source, .. } => format!("IO error: {}", source),
            AppError::InvalidCommand { reason, .. } => format!("{} (type `help`)", reason),
        }
    }
}

// Manual From<AudioError> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<AudioError> for AppError {
    #[track_caller]
    fn from(source: AudioError) -> Self {
        AppError::Session {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
