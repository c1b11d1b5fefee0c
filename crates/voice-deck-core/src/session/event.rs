use crate::{
    device::DeviceEvent,
    model::{AudioClip, CoverImage, RecordingId},
};

use std::path::PathBuf;

use chrono::{DateTime, Local};
use uuid::Uuid;

/// Everything that can change a session: user commands and the outcomes of
/// effects reported back by devices.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// User asked to start recording.
    StartCapture {
        /// Id used to correlate this capture across log lines.
        session_id: Uuid,
    },
    /// Microphone access granted and capture running.
    CaptureStarted {
        /// Capture this outcome belongs to.
        session_id: Uuid,
    },
    /// Microphone access refused or capture could not start.
    CaptureFailed {
        /// Capture this outcome belongs to.
        session_id: Uuid,
        /// User-facing explanation.
        reason: String,
    },
    /// One second of capture elapsed.
    CaptureTick,
    /// User asked to stop recording.
    StopCapture,
    /// Capture stopped and the audio was encoded.
    CaptureFinished {
        /// Capture this outcome belongs to.
        session_id: Uuid,
        /// Encoded audio.
        clip: AudioClip,
        /// When capture stopped.
        created_at: DateTime<Local>,
    },
    /// Capture stopped but produced no usable audio.
    CaptureAborted {
        /// Capture this outcome belongs to.
        session_id: Uuid,
        /// User-facing explanation.
        reason: String,
    },

    /// Set the label for the next recording.
    SetLabel(String),
    /// Read an image file as the next recording's cover.
    LoadCover(PathBuf),
    /// Image file read successfully.
    CoverLoaded(CoverImage),
    /// Image file could not be used.
    CoverFailed {
        /// User-facing explanation.
        reason: String,
    },
    /// Drop the pending cover.
    ClearCover,

    /// Play or pause a recording.
    Toggle(RecordingId),
    /// A device could not be created or could not start.
    PlaybackFailed {
        /// Recording whose device failed.
        id: RecordingId,
        /// User-facing explanation.
        reason: String,
    },
    /// Seek the selected recording, `0..=100` of its duration.
    Seek(f64),
    /// Play the entry after the selected one.
    SkipNext,
    /// Play the entry before the selected one.
    SkipPrevious,
    /// Report from a playback device.
    Device(DeviceEvent),

    /// Remove a recording and release its device.
    Delete(RecordingId),

    /// Show or hide the recordings sidebar.
    ToggleSidebar,
    /// Show the new-recording panel.
    OpenRecorder,
    /// Hide the new-recording panel.
    CloseRecorder,
    /// Clear the user-facing notice.
    DismissNotice,
}
