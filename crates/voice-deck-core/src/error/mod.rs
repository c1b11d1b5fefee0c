use error_location::ErrorLocation;
use thiserror::Error;

/// Session and device errors with source location tracking.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Microphone access was refused or no input device is available.
    #[error("Microphone access denied: {reason} {location}")]
    PermissionDenied {
        /// Why access could not be obtained.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A capture session is already running or being requested.
    #[error("Capture already in progress {location}")]
    CaptureBusy {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio data captured.
    #[error("No audio captured {location}")]
    NoAudioCaptured {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Playback device failed to start or resume.
    #[error("Playback failed: {reason} {location}")]
    PlaybackFailure {
        /// Description of the playback failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resource could not be decoded.
    #[error("Decode failed: {reason} {location}")]
    DecodeFailure {
        /// Description of the decode failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Captured audio could not be encoded.
    #[error("Encoding failed: {reason} {location}")]
    EncodingError {
        /// Description of the encoding failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Cover image could not be read or is not an image.
    #[error("Image load failed for {path:?}: {reason} {location}")]
    ImageLoadFailed {
        /// Path of the image file.
        path: std::path::PathBuf,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl AudioError {
    /// Short message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            AudioError::PermissionDenied { .. } => "Please allow microphone access".to_string(),
            AudioError::CaptureBusy { .. } => "A recording is already in progress".to_string(),
            AudioError::NoAudioCaptured { .. } => "Nothing was recorded".to_string(),
            AudioError::PlaybackFailure { reason, .. } => format!("Could not play: {}", reason),
            AudioError::DecodeFailure { reason, .. } => format!("Could not decode: {}", reason),
            AudioError::EncodingError { reason, .. } => format!("Could not save: {}", reason),
            AudioError::DeviceError { reason, .. } => format!("Audio device error: {}", reason),
            AudioError::ImageLoadFailed { reason, .. } => {
                format!("Could not load cover image: {}", reason)
            }
        }
    }
}

/// Result type alias using [`AudioError`].
pub type Result<T> = std::result::Result<T, AudioError>;
